use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use crate::adapters::{router, AppState};
use crate::core::{Todo, TodoDraft};
use crate::storage::sqlite::SqliteTodoStore;
use crate::storage::{ListOrder, TodoStore};

async fn server_with_store() -> (TestServer, Arc<SqliteTodoStore>) {
    let store = Arc::new(
        SqliteTodoStore::connect_memory()
            .await
            .expect("open in-memory store"),
    );
    let state = AppState::new(Arc::clone(&store)).expect("build app state");
    let mut server = TestServer::new(router(state)).expect("start test server");
    server.save_cookies();
    (server, store)
}

async fn seed_todo(store: &SqliteTodoStore) -> Todo {
    store
        .create(TodoDraft {
            title: "Test Todo".to_string(),
            description: "Test description".to_string(),
            completed: false,
        })
        .await
        .expect("seed todo")
}

#[tokio::test]
async fn home_page_lists_todos() {
    let (server, store) = server_with_store().await;
    seed_todo(&store).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("Test Todo"));
    assert!(page.contains("Test description"));
}

#[tokio::test]
async fn home_page_shows_empty_state() {
    let (server, _store) = server_with_store().await;

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("No todos yet"));
}

#[tokio::test]
async fn create_form_page_renders() {
    let (server, _store) = server_with_store().await;

    let response = server.get("/create/").await;
    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("New Todo"));
    assert!(page.contains("Enter todo title"));
}

#[tokio::test]
async fn creating_a_todo_persists_and_redirects() {
    let (server, store) = server_with_store().await;

    let response = server
        .post("/create/")
        .form(&json!({
            "title": "New Todo",
            "description": "New description",
        }))
        .await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/");

    let todos = store.list(ListOrder::default()).await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "New Todo");
    assert_eq!(todos[0].description, "New description");
    assert!(!todos[0].completed);
}

#[tokio::test]
async fn creating_shows_flash_message_once() {
    let (server, _store) = server_with_store().await;

    server
        .post("/create/")
        .form(&json!({ "title": "New Todo", "description": "" }))
        .await
        .assert_status(StatusCode::FOUND);

    let first = server.get("/").await;
    assert!(first.text().contains("Todo created successfully!"));

    let second = server.get("/").await;
    assert!(!second.text().contains("Todo created successfully!"));
}

#[tokio::test]
async fn creating_without_title_shows_field_error() {
    let (server, store) = server_with_store().await;

    let response = server
        .post("/create/")
        .form(&json!({ "title": "", "description": "whatever" }))
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("This field is required."));
    assert!(store.list(ListOrder::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_form_is_prefilled() {
    let (server, store) = server_with_store().await;
    let todo = seed_todo(&store).await;

    let response = server.get(&format!("/{}/update/", todo.id)).await;
    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("Edit Todo"));
    assert!(page.contains("Test Todo"));
}

#[tokio::test]
async fn updating_a_todo_persists_and_redirects() {
    let (server, store) = server_with_store().await;
    let todo = seed_todo(&store).await;

    let response = server
        .post(&format!("/{}/update/", todo.id))
        .form(&json!({
            "title": "Updated Todo",
            "description": "Updated description",
            "completed": "on",
        }))
        .await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/");

    let updated = store.get(todo.id).await.unwrap();
    assert_eq!(updated.title, "Updated Todo");
    assert_eq!(updated.description, "Updated description");
    assert!(updated.completed);
}

#[tokio::test]
async fn updating_without_title_rerenders_with_error() {
    let (server, store) = server_with_store().await;
    let todo = seed_todo(&store).await;

    let response = server
        .post(&format!("/{}/update/", todo.id))
        .form(&json!({ "title": "", "description": "" }))
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("This field is required."));

    // Record untouched.
    assert_eq!(store.get(todo.id).await.unwrap().title, "Test Todo");
}

#[tokio::test]
async fn delete_confirmation_page_shows_title() {
    let (server, store) = server_with_store().await;
    let todo = seed_todo(&store).await;

    let response = server.get(&format!("/{}/delete/", todo.id)).await;
    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("Are you sure"));
    assert!(page.contains("Test Todo"));
}

#[tokio::test]
async fn deleting_a_todo_removes_it() {
    let (server, store) = server_with_store().await;
    let todo = seed_todo(&store).await;

    let response = server.post(&format!("/{}/delete/", todo.id)).await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/");

    assert!(store.list(ListOrder::default()).await.unwrap().is_empty());

    let home = server.get("/").await;
    assert!(home.text().contains("Todo deleted successfully!"));
}

#[tokio::test]
async fn unknown_id_answers_not_found() {
    let (server, store) = server_with_store().await;
    seed_todo(&store).await;

    server
        .get("/9999/update/")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/9999/update/")
        .form(&json!({ "title": "nope", "description": "" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/9999/delete/")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/9999/delete/")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Nothing was disturbed.
    assert_eq!(store.list(ListOrder::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let (server, _store) = server_with_store().await;

    let response = server.get("/abc/update/").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
