use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::{Todo, TodoDraft};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const TITLE_MAX_LENGTH: usize = 200;

/// Widget kind used when rendering a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    Textarea,
    Checkbox,
}

/// Declarative description of one form field: how it renders and whether
/// it must be present. This table is the only source of widget metadata;
/// nothing is inferred from the entity at runtime.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub required: bool,
    pub placeholder: &'static str,
    pub css_class: &'static str,
}

const TODO_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        label: "Title",
        widget: Widget::TextInput,
        required: true,
        placeholder: "Enter todo title",
        css_class: "form-control",
    },
    FieldSpec {
        name: "description",
        label: "Description",
        widget: Widget::Textarea,
        required: false,
        placeholder: "Enter description (optional)",
        css_class: "form-control",
    },
    FieldSpec {
        name: "completed",
        label: "Completed",
        widget: Widget::Checkbox,
        required: false,
        placeholder: "",
        css_class: "form-check-input",
    },
];

/// Field-level validation errors, keyed by field name. Serializes to a
/// plain map so templates can look messages up per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A field spec joined with the submitted value and its errors, ready
/// for the template to render without further lookups.
#[derive(Debug, Clone, Serialize)]
pub struct BoundField {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub required: bool,
    pub placeholder: &'static str,
    pub css_class: &'static str,
    pub value: String,
    pub checked: bool,
    pub errors: Vec<String>,
}

/// Raw form payload as submitted by the browser. Only `title`,
/// `description` and `completed` are settable; anything else in the body
/// is ignored by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: Option<String>,
}

impl TodoForm {
    /// The static field table driving widget rendering and validation.
    pub fn fields() -> &'static [FieldSpec] {
        TODO_FIELDS
    }

    /// Pre-populates the form from an existing record, for the update view.
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed.then(|| "on".to_string()),
        }
    }

    /// Joins the field table with this payload's values and the given
    /// errors, producing one renderable entry per field.
    pub fn bind(&self, errors: &FormErrors) -> Vec<BoundField> {
        TODO_FIELDS
            .iter()
            .map(|spec| BoundField {
                name: spec.name,
                label: spec.label,
                widget: spec.widget,
                required: spec.required,
                placeholder: spec.placeholder,
                css_class: spec.css_class,
                value: match spec.name {
                    "title" => self.title.clone(),
                    "description" => self.description.clone(),
                    _ => String::new(),
                },
                checked: spec.widget == Widget::Checkbox
                    && checkbox_checked(self.completed.as_deref()),
                errors: errors.get(spec.name).to_vec(),
            })
            .collect()
    }

    /// Validates the payload into a draft the store will accept, or
    /// returns per-field messages for redisplay.
    pub fn validate(&self) -> Result<TodoDraft, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", REQUIRED_MESSAGE);
        } else if title.chars().count() > TITLE_MAX_LENGTH {
            errors.add(
                "title",
                format!("Ensure this value has at most {TITLE_MAX_LENGTH} characters."),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TodoDraft {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            completed: checkbox_checked(self.completed.as_deref()),
        })
    }
}

/// HTML checkbox semantics: the field is absent when unchecked and
/// carries "on" when checked; explicit "false"/"0"/"off" count as
/// unchecked.
fn checkbox_checked(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "off"
        ),
    }
}
