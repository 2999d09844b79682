use async_trait::async_trait;
use chrono::Utc;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};

use crate::core::{AppError, Todo, TodoDraft};
use crate::storage::{ListOrder, TodoStore};

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, completed, created_at, updated_at FROM todos";

pub struct SqliteTodoStore {
    pool: SqlitePool,
}

impl SqliteTodoStore {
    /// Opens (creating if necessary) the database at `database_url` and
    /// ensures the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            Sqlite::create_database(database_url).await?;
        }
        let pool = SqlitePool::connect(database_url).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// In-memory database on a single pooled connection, for tests.
    pub async fn connect_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn list(&self, order: ListOrder) -> Result<Vec<Todo>, AppError> {
        let query = match order {
            ListOrder::CreatedDesc => {
                format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC")
            }
            ListOrder::CreatedAsc => format!("{SELECT_COLUMNS} ORDER BY created_at ASC, id ASC"),
        };
        sqlx::query_as(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn get(&self, id: i64) -> Result<Todo, AppError> {
        let query = format!("{SELECT_COLUMNS} WHERE id = ?");
        sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("todo", id))
    }

    async fn create(&self, draft: TodoDraft) -> Result<Todo, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO todos (title, description, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.completed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        self.get(result.last_insert_rowid()).await
    }

    async fn update(&self, id: i64, draft: TodoDraft) -> Result<Todo, AppError> {
        let result = sqlx::query(
            "UPDATE todos SET title = ?, description = ?, completed = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.completed)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("todo", id));
        }
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("todo", id));
        }
        Ok(())
    }
}
