//! Todo repository for CRUD operations

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{Todo, TodoPayload};

/// Todo repository
#[derive(Clone)]
pub struct TodoRepository {
    pool: SqlitePool,
}

impl TodoRepository {
    /// Create a new todo repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch all todos
    pub async fn list(&self) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, name, content, is_complete, user_id, created_at
            FROM todos
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    /// Fetch a single todo by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, name, content, is_complete, user_id, created_at
            FROM todos
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    /// Insert a new todo. The payload must have passed validation.
    pub async fn create(&self, payload: &TodoPayload) -> Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (name, content, is_complete, user_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, content, is_complete, user_id, created_at
            "#,
        )
        .bind(payload.name.as_deref().unwrap_or_default())
        .bind(&payload.content)
        .bind(payload.is_complete)
        .bind(payload.user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    /// Replace every mutable field of a todo. Returns false when no record
    /// with that ID exists.
    pub async fn update(&self, id: i64, payload: &TodoPayload) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET name = ?, content = ?, is_complete = ?, user_id = ?
            WHERE id = ?
            "#,
        )
        .bind(payload.name.as_deref().unwrap_or_default())
        .bind(&payload.content)
        .bind(payload.is_complete)
        .bind(payload.user_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a todo by ID. Returns false when no record with that ID exists.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count stored todos
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
