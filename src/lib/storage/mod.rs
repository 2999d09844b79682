pub mod sqlite;

use async_trait::async_trait;

use crate::core::{AppError, Todo, TodoDraft};

/// Listing order for `TodoStore::list`. Newest-first is the default the
/// home page relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    #[default]
    CreatedDesc,
    CreatedAsc,
}

/// Persistence contract for todo records. Handlers only ever see this
/// trait; the concrete store is chosen at startup.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All records in the given order.
    async fn list(&self, order: ListOrder) -> Result<Vec<Todo>, AppError>;
    /// The record with this id, or `AppError::NotFound`.
    async fn get(&self, id: i64) -> Result<Todo, AppError>;
    /// Inserts a new record; the store assigns id and timestamps.
    async fn create(&self, draft: TodoDraft) -> Result<Todo, AppError>;
    /// Rewrites the non-key fields and refreshes `updated_at`.
    async fn update(&self, id: i64, draft: TodoDraft) -> Result<Todo, AppError>;
    /// Removes the record permanently.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
