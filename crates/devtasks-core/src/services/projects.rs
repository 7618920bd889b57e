//! Project registry
//!
//! A project is a folder on disk (keyed by its path) or the path-less
//! default workspace seeded on first run.

use std::path::{Path, PathBuf};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Project, DEFAULT_PROJECT_COLOR};
use crate::utils::now_timestamp;

/// How many projects `recent` returns
pub const RECENT_PROJECTS_LIMIT: i64 = 5;

/// Resolve a candidate folder to its canonical path.
///
/// Returns `None` when the candidate does not exist or is not a directory,
/// the same way a cancelled folder picker yields nothing.
pub fn select_folder(candidate: &Path) -> Option<PathBuf> {
    let canonical = std::fs::canonicalize(candidate).ok()?;
    if canonical.is_dir() {
        Some(canonical)
    } else {
        None
    }
}

/// Display name for a folder: its last path component
pub fn folder_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| path.to_string())
}

#[derive(Clone)]
pub struct ProjectRepository {
    db: Database,
}

impl ProjectRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Return the project registered for `path`, creating it on first open.
    pub async fn open(&self, path: &str) -> Result<Project> {
        let path = path.trim();
        if path.is_empty() {
            return Err(Error::validation("Project path is required"));
        }

        let inserted = sqlx::query(
            r#"INSERT INTO projects (name, color, path, created_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(path) DO NOTHING"#,
        )
        .bind(folder_name(path))
        .bind(DEFAULT_PROJECT_COLOR)
        .bind(path)
        .bind(now_timestamp())
        .execute(&self.db.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            log::info!("Registered project for {}", path);
        }

        let project = sqlx::query_as("SELECT * FROM projects WHERE path = ?")
            .bind(path)
            .fetch_one(&self.db.pool)
            .await?;
        Ok(project)
    }

    /// Folder-backed projects, most recently registered first
    pub async fn recent(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as(
            "SELECT * FROM projects WHERE path IS NOT NULL ORDER BY id DESC LIMIT ?",
        )
        .bind(RECENT_PROJECTS_LIMIT)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(projects)
    }

    /// Every project, including the default workspace
    pub async fn list(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as("SELECT * FROM projects ORDER BY id ASC")
            .fetch_all(&self.db.pool)
            .await?;
        Ok(projects)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Project>> {
        let project = sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(project)
    }
}
