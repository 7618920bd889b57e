//! Subtask repository

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::Subtask;
use crate::utils::now_timestamp;

const SUBTASK_COLUMNS: &str =
    "id, task_id, title, COALESCE(is_completed, 0) AS is_completed, created_at";

#[derive(Clone)]
pub struct SubtaskRepository {
    db: Database,
}

impl SubtaskRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Subtasks of a task in creation order
    pub async fn list(&self, task_id: i64) -> Result<Vec<Subtask>> {
        let query = format!(
            "SELECT {} FROM subtasks WHERE task_id = ? ORDER BY created_at ASC, id ASC",
            SUBTASK_COLUMNS
        );
        let subtasks = sqlx::query_as(&query)
            .bind(task_id)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(subtasks)
    }

    pub async fn add(&self, task_id: i64, title: &str) -> Result<Subtask> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation("Subtask title is required"));
        }

        let parent: Option<(i64,)> = sqlx::query_as("SELECT id FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.db.pool)
            .await?;
        if parent.is_none() {
            return Err(Error::not_found(format!("task {}", task_id)));
        }

        let query = format!(
            "INSERT INTO subtasks (task_id, title, is_completed, created_at) VALUES (?, ?, 0, ?) RETURNING {}",
            SUBTASK_COLUMNS
        );
        let subtask = sqlx::query_as(&query)
            .bind(task_id)
            .bind(title)
            .bind(now_timestamp())
            .fetch_one(&self.db.pool)
            .await?;
        Ok(subtask)
    }

    /// Set the completion flag. Returns false when the subtask does not exist.
    pub async fn toggle(&self, id: i64, is_completed: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE subtasks SET is_completed = ? WHERE id = ?")
            .bind(is_completed)
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = ?")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
