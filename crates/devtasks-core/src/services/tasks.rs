//! Task repository
//!
//! Every read goes through [`TASK_WITH_STATS`], which computes logged time
//! and subtask counts from the underlying rows. Nothing aggregate is cached.

use sqlx::SqliteConnection;

use super::tags::{insert_link, normalize_tag_name, upsert_tag};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NewTask, Task, TaskWithStats};
use crate::utils::now_timestamp;

const TASK_WITH_STATS: &str = r#"
    SELECT
        t.id,
        t.project_id,
        t.title,
        t.description,
        COALESCE(t.status, 'todo') AS status,
        COALESCE(t.priority, 'medium') AS priority,
        COALESCE(t.category, 'feature') AS category,
        COALESCE(t.estimated_hours, 0.0) AS estimated_hours,
        t.due_date,
        t.local_path,
        t.timer_start,
        t.created_at,
        COALESCE((SELECT SUM(duration_seconds) FROM time_logs WHERE task_id = t.id), 0) AS total_logged,
        (SELECT COUNT(*) FROM subtasks WHERE task_id = t.id) AS total_subtasks,
        (SELECT COUNT(*) FROM subtasks WHERE task_id = t.id AND is_completed = 1) AS completed_subtasks
    FROM tasks t
"#;

fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("Task title is required"));
    }
    Ok(title)
}

fn validate_estimate(hours: f64) -> Result<()> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(Error::validation(format!(
            "Estimated hours must be a non-negative number, got {}",
            hours
        )));
    }
    Ok(())
}

async fn project_exists(conn: &mut SqliteConnection, project_id: i64) -> Result<bool> {
    let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

#[derive(Clone)]
pub struct TaskRepository {
    db: Database,
}

impl TaskRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Tasks of a project, newest first, with live aggregates.
    /// A missing project id yields an empty list.
    pub async fn list(&self, project_id: Option<i64>) -> Result<Vec<TaskWithStats>> {
        let Some(project_id) = project_id else {
            return Ok(Vec::new());
        };

        let query = format!(
            "{} WHERE t.project_id = ? ORDER BY t.created_at DESC, t.id DESC",
            TASK_WITH_STATS
        );
        let tasks = sqlx::query_as(&query)
            .bind(project_id)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn get(&self, id: i64) -> Result<Option<TaskWithStats>> {
        let query = format!("{} WHERE t.id = ?", TASK_WITH_STATS);
        let task = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(task)
    }

    /// Insert a task and link its tags in one transaction.
    ///
    /// Blank tag names are skipped and repeated names link once.
    pub async fn create(&self, new_task: NewTask) -> Result<TaskWithStats> {
        let title = validate_title(&new_task.title)?;
        validate_estimate(new_task.estimated_hours)?;

        let mut tx = self.db.pool.begin().await?;

        if !project_exists(&mut tx, new_task.project_id).await? {
            return Err(Error::not_found(format!("project {}", new_task.project_id)));
        }

        let task: Task = sqlx::query_as(
            r#"INSERT INTO tasks (
                   project_id, title, description, status, priority, category,
                   estimated_hours, due_date, local_path, created_at
               )
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(new_task.project_id)
        .bind(title)
        .bind(&new_task.description)
        .bind(new_task.status)
        .bind(new_task.priority)
        .bind(new_task.category)
        .bind(new_task.estimated_hours)
        .bind(new_task.due_date)
        .bind(&new_task.local_path)
        .bind(now_timestamp())
        .fetch_one(&mut *tx)
        .await?;

        for name in new_task.tags.iter().filter_map(|n| normalize_tag_name(n)) {
            let tag = upsert_tag(&mut tx, name).await?;
            insert_link(&mut tx, task.id, tag.id).await?;
        }

        tx.commit().await?;
        log::debug!("Created task {} in project {}", task.id, task.project_id);

        Ok(TaskWithStats::fresh(task))
    }

    /// Replace the editable fields of `task` and return the stored row.
    ///
    /// `timer_start`, `project_id` and `created_at` are not editable here.
    /// Returns `None` when no task has that id.
    pub async fn update(&self, task: &Task) -> Result<Option<TaskWithStats>> {
        let title = validate_title(&task.title)?;
        validate_estimate(task.estimated_hours)?;

        let result = sqlx::query(
            r#"UPDATE tasks
               SET title = ?, description = ?, status = ?, priority = ?, category = ?,
                   due_date = ?, estimated_hours = ?, local_path = ?
               WHERE id = ?"#,
        )
        .bind(title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.category)
        .bind(task.due_date)
        .bind(task.estimated_hours)
        .bind(&task.local_path)
        .bind(task.id)
        .execute(&self.db.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(task.id).await
    }

    /// Delete a task together with its tag links, subtasks and time logs.
    /// Returns false when the task did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.db.pool.begin().await?;

        // Children first so foreign keys stay satisfied
        sqlx::query("DELETE FROM task_tags WHERE task_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM subtasks WHERE task_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM time_logs WHERE task_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            log::debug!("Deleted task {}", id);
        }
        Ok(deleted)
    }
}
