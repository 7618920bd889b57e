//! Bulk export/import of the whole store
//!
//! Export reads every table inside one read transaction. Import is a
//! destructive replace inside one write transaction: either every row of the
//! document lands with its original id, or nothing changes.

use std::path::Path;

use chrono::Utc;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{ExportDocument, ImportOutcome, ImportSummary};
use crate::utils::format_timestamp;

/// Version written into new export documents
pub const EXPORT_VERSION: i64 = 1;

/// Document versions `import` accepts
pub const SUPPORTED_VERSIONS: &[i64] = &[1];

fn check_version(version: i64) -> Result<()> {
    if SUPPORTED_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(Error::UnsupportedVersion(version))
    }
}

#[derive(Clone)]
pub struct DataTransfer {
    db: Database,
}

impl DataTransfer {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Snapshot every table into a portable document.
    pub async fn export(&self) -> Result<ExportDocument> {
        let mut tx = self.db.pool.begin().await?;

        let projects = sqlx::query_as("SELECT * FROM projects ORDER BY id")
            .fetch_all(&mut *tx)
            .await?;
        let tasks = sqlx::query_as("SELECT * FROM tasks ORDER BY id")
            .fetch_all(&mut *tx)
            .await?;
        let subtasks = sqlx::query_as(
            "SELECT id, task_id, title, COALESCE(is_completed, 0) AS is_completed, created_at FROM subtasks ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;
        let tags = sqlx::query_as("SELECT id, name, color FROM tags ORDER BY id")
            .fetch_all(&mut *tx)
            .await?;
        let task_tags = sqlx::query_as("SELECT task_id, tag_id FROM task_tags ORDER BY task_id, tag_id")
            .fetch_all(&mut *tx)
            .await?;
        let time_logs = sqlx::query_as(
            "SELECT id, task_id, start_time, end_time, duration_seconds, created_at FROM time_logs ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ExportDocument {
            version: EXPORT_VERSION,
            date: format_timestamp(Utc::now()),
            projects,
            tasks,
            subtasks,
            tags,
            task_tags,
            time_logs,
        })
    }

    /// Export and write the document as pretty JSON.
    ///
    /// The file is written next to `path` first and renamed into place, so a
    /// failed write never leaves a truncated document behind.
    pub async fn export_to_file(&self, path: &Path) -> Result<ExportDocument> {
        let document = self.export().await?;
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let partial = path.with_extension("partial");
        if let Err(e) = tokio::fs::write(&partial, json).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tokio::fs::rename(&partial, path).await?;

        log::info!("Exported store to {}", path.display());
        Ok(document)
    }

    /// Read and parse an export document without touching the store.
    pub async fn read_document(path: &Path) -> Result<ExportDocument> {
        let raw = tokio::fs::read_to_string(path).await?;
        let document: ExportDocument = serde_json::from_str(&raw)?;
        Ok(document)
    }

    /// Replace the whole store with `document`.
    pub async fn import(&self, document: &ExportDocument) -> Result<ImportSummary> {
        check_version(document.version)?;

        let _maintenance = self.db.maintenance().await;
        let mut tx = self.db.pool.begin().await?;

        // Dependents before their parents
        for table in ["task_tags", "subtasks", "time_logs", "tasks", "projects", "tags"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }

        for p in &document.projects {
            sqlx::query("INSERT INTO projects (id, name, color, path, created_at) VALUES (?, ?, ?, ?, ?)")
                .bind(p.id)
                .bind(&p.name)
                .bind(&p.color)
                .bind(&p.path)
                .bind(&p.created_at)
                .execute(&mut *tx)
                .await?;
        }

        for t in &document.tags {
            sqlx::query("INSERT INTO tags (id, name, color) VALUES (?, ?, ?)")
                .bind(t.id)
                .bind(&t.name)
                .bind(&t.color)
                .execute(&mut *tx)
                .await?;
        }

        for t in &document.tasks {
            sqlx::query(
                r#"INSERT INTO tasks (
                       id, project_id, title, description, status, priority, category,
                       estimated_hours, due_date, local_path, timer_start, created_at
                   )
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(t.id)
            .bind(t.project_id)
            .bind(&t.title)
            .bind(&t.description)
            .bind(t.status)
            .bind(t.priority)
            .bind(t.category)
            .bind(t.estimated_hours)
            .bind(t.due_date)
            .bind(&t.local_path)
            .bind(&t.timer_start)
            .bind(&t.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for s in &document.subtasks {
            sqlx::query("INSERT INTO subtasks (id, task_id, title, is_completed, created_at) VALUES (?, ?, ?, ?, ?)")
                .bind(s.id)
                .bind(s.task_id)
                .bind(&s.title)
                .bind(s.is_completed)
                .bind(&s.created_at)
                .execute(&mut *tx)
                .await?;
        }

        for link in &document.task_tags {
            sqlx::query("INSERT INTO task_tags (task_id, tag_id) VALUES (?, ?)")
                .bind(link.task_id)
                .bind(link.tag_id)
                .execute(&mut *tx)
                .await?;
        }

        for l in &document.time_logs {
            sqlx::query(
                r#"INSERT INTO time_logs (id, task_id, start_time, end_time, duration_seconds, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(l.id)
            .bind(l.task_id)
            .bind(&l.start_time)
            .bind(&l.end_time)
            .bind(l.duration_seconds)
            .bind(&l.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let summary = ImportSummary {
            projects: document.projects.len(),
            tasks: document.tasks.len(),
            subtasks: document.subtasks.len(),
            tags: document.tags.len(),
            task_tags: document.task_tags.len(),
            time_logs: document.time_logs.len(),
        };
        log::info!("Imported store: {:?}", summary);
        Ok(summary)
    }

    /// `import` for collaborators that expect `{success, error?}`.
    pub async fn import_data(&self, document: &ExportDocument) -> ImportOutcome {
        match self.import(document).await {
            Ok(summary) => ImportOutcome {
                success: true,
                error: None,
                summary: Some(summary),
            },
            Err(e) => {
                log::error!("Import failed, store left unchanged: {}", e);
                ImportOutcome {
                    success: false,
                    error: Some(e.to_string()),
                    summary: None,
                }
            }
        }
    }

    /// Read `path` and import it. Unreadable or malformed files fail before
    /// the store is touched.
    pub async fn import_file(&self, path: &Path) -> ImportOutcome {
        match Self::read_document(path).await {
            Ok(document) => self.import_data(&document).await,
            Err(e) => {
                log::error!("Could not read import file {}: {}", path.display(), e);
                ImportOutcome {
                    success: false,
                    error: Some(e.to_string()),
                    summary: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_version() {
        assert!(check_version(EXPORT_VERSION).is_ok());
        assert!(matches!(check_version(2), Err(Error::UnsupportedVersion(2))));
        assert!(matches!(check_version(0), Err(Error::UnsupportedVersion(0))));
    }
}
