//! Timer engine
//!
//! Each task is either Idle (`timer_start IS NULL`) or Running
//! (`timer_start = T`). Stopping a running timer writes exactly one
//! `time_logs` row and returns the task to Idle.

use chrono::{DateTime, Utc};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Task, TimeLog};
use crate::utils::{duration_seconds, format_timestamp, parse_timestamp};

#[derive(Clone)]
pub struct TimerEngine {
    db: Database,
}

impl TimerEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Start timing `task_id` now. See [`TimerEngine::start_at`].
    pub async fn start(&self, task_id: i64) -> Result<Option<String>> {
        self.start_at(task_id, Utc::now()).await
    }

    /// Idle -> Running.
    ///
    /// Returns the session's start timestamp. If the timer is already
    /// running the original start is kept and returned. `None` means the
    /// task does not exist.
    pub async fn start_at(&self, task_id: i64, now: DateTime<Utc>) -> Result<Option<String>> {
        let result = sqlx::query("UPDATE tasks SET timer_start = ? WHERE id = ? AND timer_start IS NULL")
            .bind(format_timestamp(now))
            .bind(task_id)
            .execute(&self.db.pool)
            .await?;

        let row: Option<(Option<String>,)> = sqlx::query_as("SELECT timer_start FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.db.pool)
            .await?;

        if result.rows_affected() > 0 {
            log::debug!("Timer started for task {}", task_id);
        }
        Ok(row.and_then(|(start,)| start))
    }

    /// Stop timing `task_id` now. See [`TimerEngine::stop_at`].
    pub async fn stop(&self, task_id: i64) -> Result<Option<TimeLog>> {
        self.stop_at(task_id, Utc::now()).await
    }

    /// Running -> Idle.
    ///
    /// Writes one time log for the session and clears `timer_start`.
    /// Returns `None` without writing anything when the timer is idle or
    /// the task does not exist.
    pub async fn stop_at(&self, task_id: i64, now: DateTime<Utc>) -> Result<Option<TimeLog>> {
        let mut tx = self.db.pool.begin().await?;

        // The first statement is a write so the transaction holds the write
        // lock before it reads. A concurrent stop waits here and then sees Idle.
        let claimed = sqlx::query(
            "UPDATE tasks SET timer_start = timer_start WHERE id = ? AND timer_start IS NOT NULL",
        )
        .bind(task_id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let (started,): (String,) = sqlx::query_as("SELECT timer_start FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_one(&mut *tx)
            .await?;

        let duration = match parse_timestamp(&started) {
            Some(start) => duration_seconds(start, now),
            None => {
                log::warn!("Task {} has unreadable timer_start {:?}; logging 0s", task_id, started);
                0
            }
        };
        let ended = format_timestamp(now);

        let log: TimeLog = sqlx::query_as(
            r#"INSERT INTO time_logs (task_id, start_time, end_time, duration_seconds, created_at)
               VALUES (?, ?, ?, ?, ?)
               RETURNING id, task_id, start_time, end_time, duration_seconds, created_at"#,
        )
        .bind(task_id)
        .bind(&started)
        .bind(&ended)
        .bind(duration)
        .bind(&ended)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE tasks SET timer_start = NULL WHERE id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        log::debug!("Timer stopped for task {}: {}s", task_id, duration);

        Ok(Some(log))
    }

    /// Completed sessions of a task, latest first
    pub async fn time_logs(&self, task_id: i64) -> Result<Vec<TimeLog>> {
        let logs = sqlx::query_as(
            r#"SELECT id, task_id, start_time, end_time, duration_seconds, created_at
               FROM time_logs
               WHERE task_id = ?
               ORDER BY start_time DESC, id DESC"#,
        )
        .bind(task_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(logs)
    }

    /// Logged seconds plus the open session at `now`. `None` for an unknown task.
    pub async fn elapsed_at(&self, task_id: i64, now: DateTime<Utc>) -> Result<Option<i64>> {
        let row: Option<(i64, Option<String>)> = sqlx::query_as(
            r#"SELECT COALESCE((SELECT SUM(duration_seconds) FROM time_logs WHERE task_id = t.id), 0),
                      t.timer_start
               FROM tasks t
               WHERE t.id = ?"#,
        )
        .bind(task_id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(row.map(|(logged, started)| {
            let running = started
                .as_deref()
                .and_then(parse_timestamp)
                .map(|start| duration_seconds(start, now))
                .unwrap_or(0);
            logged + running
        }))
    }

    /// Tasks with an open session, optionally limited to one project
    pub async fn running(&self, project_id: Option<i64>) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as(
            r#"SELECT * FROM tasks
               WHERE timer_start IS NOT NULL AND (? IS NULL OR project_id = ?)
               ORDER BY timer_start ASC"#,
        )
        .bind(project_id)
        .bind(project_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(tasks)
    }
}
