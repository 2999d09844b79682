//! Template engine setup. Template sources are embedded at compile time
//! so rendering never depends on the process working directory.

use tera::Tera;

pub const TEMPLATE_HOME: &str = "home.html";
pub const TEMPLATE_FORM: &str = "todo_form.html";
pub const TEMPLATE_CONFIRM_DELETE: &str = "todo_confirm_delete.html";

/// Builds the Tera instance with every page template registered.
/// Called once at startup; a broken template fails the boot.
pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        (TEMPLATE_HOME, include_str!("../../templates/home.html")),
        (TEMPLATE_FORM, include_str!("../../templates/todo_form.html")),
        (
            TEMPLATE_CONFIRM_DELETE,
            include_str!("../../templates/todo_confirm_delete.html"),
        ),
    ])?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    #[test]
    fn all_templates_compile() {
        templates().unwrap();
    }

    #[test]
    fn home_renders_empty_state() {
        let tera = templates().unwrap();
        let mut context = Context::new();
        context.insert("todos", &Vec::<serde_json::Value>::new());
        context.insert("messages", &Vec::<serde_json::Value>::new());
        let page = tera.render(TEMPLATE_HOME, &context).unwrap();
        assert!(page.contains("No todos yet"));
    }
}
