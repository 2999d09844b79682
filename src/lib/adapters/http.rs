use axum::{
    extract::{Form, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::info;

use crate::core::{AppError, Todo};
use crate::flash::{FlashStore, Message, SessionId};
use crate::forms::{FormErrors, TodoForm};
use crate::render::{self, TEMPLATE_CONFIRM_DELETE, TEMPLATE_FORM, TEMPLATE_HOME};
use crate::storage::{ListOrder, TodoStore};

/// Shared handler state: the store handle, the compiled templates and the
/// pending flash messages. Passed explicitly; nothing lives in a global.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub templates: Tera,
    pub flash: FlashStore,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>) -> Result<Self, AppError> {
        Ok(Self {
            store,
            templates: render::templates()?,
            flash: FlashStore::new(),
        })
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            templates: self.templates.clone(),
            flash: self.flash.clone(),
        }
    }
}

/// The full route table, evaluated once at startup.
pub fn router<S: TodoStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(list_todos::<S>))
        .route("/create/", get(create_todo_form::<S>).post(create_todo::<S>))
        .route(
            "/{id}/update/",
            get(update_todo_form::<S>).post(update_todo::<S>),
        )
        .route(
            "/{id}/delete/",
            get(delete_todo_confirm::<S>).post(delete_todo::<S>),
        )
        .with_state(state)
}

/// Serves the application over a TCP listener.
pub struct HttpServer<S: TodoStore + 'static> {
    state: AppState<S>,
}

impl<S: TodoStore + 'static> HttpServer<S> {
    pub fn new(store: Arc<S>) -> Result<Self, AppError> {
        Ok(Self {
            state: AppState::new(store)?,
        })
    }

    pub async fn serve(&self, addr: &str) -> Result<(), AppError> {
        let app = router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %addr, "HTTP server started");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn list_todos<S: TodoStore>(
    State(state): State<AppState<S>>,
    session: SessionId,
) -> Result<Response, AppError> {
    let todos = state.store.list(ListOrder::default()).await?;
    let messages = state.flash.drain(&session.value);

    let mut context = Context::new();
    context.insert("todos", &todos);
    context.insert("messages", &messages);
    let page = state.templates.render(TEMPLATE_HOME, &context)?;
    Ok(with_session(session, Html(page)))
}

async fn create_todo_form<S: TodoStore>(
    State(state): State<AppState<S>>,
    session: SessionId,
) -> Result<Response, AppError> {
    let page = render_form(
        &state.templates,
        &TodoForm::default(),
        &FormErrors::default(),
        None,
    )?;
    Ok(with_session(session, page))
}

async fn create_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    session: SessionId,
    Form(form): Form<TodoForm>,
) -> Result<Response, AppError> {
    match form.validate() {
        Ok(draft) => {
            let todo = state.store.create(draft).await?;
            info!(id = todo.id, title = %todo.title, "todo created");
            state
                .flash
                .push(&session.value, Message::success("Todo created successfully!"));
            Ok(with_session(session, redirect_to_home()))
        }
        Err(errors) => {
            let page = render_form(&state.templates, &form, &errors, None)?;
            Ok(with_session(session, page))
        }
    }
}

async fn update_todo_form<S: TodoStore>(
    State(state): State<AppState<S>>,
    session: SessionId,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let todo = state.store.get(id).await?;
    let page = render_form(
        &state.templates,
        &TodoForm::from_todo(&todo),
        &FormErrors::default(),
        Some(&todo),
    )?;
    Ok(with_session(session, page))
}

async fn update_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    session: SessionId,
    Path(id): Path<i64>,
    Form(form): Form<TodoForm>,
) -> Result<Response, AppError> {
    // Resolve the record first so an unknown id answers 404 even when the
    // submitted payload is invalid.
    let todo = state.store.get(id).await?;
    match form.validate() {
        Ok(draft) => {
            let updated = state.store.update(id, draft).await?;
            info!(id = updated.id, "todo updated");
            state
                .flash
                .push(&session.value, Message::success("Todo updated successfully!"));
            Ok(with_session(session, redirect_to_home()))
        }
        Err(errors) => {
            let page = render_form(&state.templates, &form, &errors, Some(&todo))?;
            Ok(with_session(session, page))
        }
    }
}

async fn delete_todo_confirm<S: TodoStore>(
    State(state): State<AppState<S>>,
    session: SessionId,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let todo = state.store.get(id).await?;
    let mut context = page_context();
    context.insert("todo", &todo);
    let page = state.templates.render(TEMPLATE_CONFIRM_DELETE, &context)?;
    Ok(with_session(session, Html(page)))
}

async fn delete_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    session: SessionId,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.store.delete(id).await?;
    info!(id, "todo deleted");
    state
        .flash
        .push(&session.value, Message::success("Todo deleted successfully!"));
    Ok(with_session(session, redirect_to_home()))
}

/// The create and update views share one template; `todo` is present only
/// when editing an existing record.
fn render_form(
    templates: &Tera,
    form: &TodoForm,
    errors: &FormErrors,
    todo: Option<&Todo>,
) -> Result<Html<String>, AppError> {
    let mut context = page_context();
    context.insert("fields", &form.bind(errors));
    context.insert("editing", &todo.is_some());
    if let Some(todo) = todo {
        context.insert("todo", todo);
    }
    Ok(Html(templates.render(TEMPLATE_FORM, &context)?))
}

/// Base context for pages that do not surface flash messages; the page
/// shell still expects a `messages` list.
fn page_context() -> Context {
    let mut context = Context::new();
    context.insert("messages", &Vec::<Message>::new());
    context
}

/// 302 back to the list page after a successful write.
fn redirect_to_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

/// Pins a freshly minted session id to the client via `Set-Cookie`.
fn with_session(session: SessionId, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    if session.fresh {
        if let Ok(value) = header::HeaderValue::from_str(&session.cookie()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
