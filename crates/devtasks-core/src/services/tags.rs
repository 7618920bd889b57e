//! Tag manager
//!
//! Tags are unique by name (trimmed, case-sensitive) and attached to tasks
//! through the `task_tags` association table.

use sqlx::SqliteConnection;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Tag, DEFAULT_TAG_COLOR};

/// Normalized form used at creation, lookup and linking.
/// Returns `None` for blank names.
pub fn normalize_tag_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Insert the tag if missing and return the stored row.
pub(crate) async fn upsert_tag(conn: &mut SqliteConnection, name: &str) -> Result<Tag> {
    sqlx::query("INSERT INTO tags (name, color) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .bind(DEFAULT_TAG_COLOR)
        .execute(&mut *conn)
        .await?;

    let tag: Tag = sqlx::query_as("SELECT id, name, color FROM tags WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(tag)
}

/// Link a task and a tag; an existing link is left alone.
/// Returns whether a new row was written.
pub(crate) async fn insert_link(conn: &mut SqliteConnection, task_id: i64, tag_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO task_tags (task_id, tag_id) VALUES (?, ?) ON CONFLICT(task_id, tag_id) DO NOTHING",
    )
    .bind(task_id)
    .bind(tag_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Tag creation and task/tag linking
#[derive(Clone)]
pub struct TagManager {
    db: Database,
}

impl TagManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All tags, alphabetically
    pub async fn list(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as("SELECT id, name, color FROM tags ORDER BY name ASC, id ASC")
            .fetch_all(&self.db.pool)
            .await?;
        Ok(tags)
    }

    /// Create a tag, or return the existing one with the same name.
    pub async fn create(&self, name: &str) -> Result<Tag> {
        let name = normalize_tag_name(name).ok_or_else(|| Error::validation("Tag name is required"))?;
        let mut conn = self.db.pool.acquire().await?;
        let tag = upsert_tag(&mut conn, name).await?;
        log::debug!("Tag {:?} resolved to id {}", tag.name, tag.id);
        Ok(tag)
    }

    /// Attach a tag to a task. Linking twice is not an error.
    pub async fn link(&self, task_id: i64, tag_id: i64) -> Result<bool> {
        let mut conn = self.db.pool.acquire().await?;
        insert_link(&mut conn, task_id, tag_id).await
    }

    /// Detach a tag from a task. Returns false when the pair was not linked.
    pub async fn unlink(&self, task_id: i64, tag_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM task_tags WHERE task_id = ? AND tag_id = ?")
            .bind(task_id)
            .bind(tag_id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Tags attached to one task
    pub async fn task_tags(&self, task_id: i64) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as(
            r#"SELECT t.id, t.name, t.color FROM tags t
               JOIN task_tags tt ON t.id = tt.tag_id
               WHERE tt.task_id = ?
               ORDER BY t.name ASC"#,
        )
        .bind(task_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(tags)
    }

    /// Look a tag up by (normalized) name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let Some(name) = normalize_tag_name(name) else {
            return Ok(None);
        };
        let tag = sqlx::query_as("SELECT id, name, color FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_tag_name("  bug "), Some("bug"));
        assert_eq!(normalize_tag_name("Bug"), Some("Bug"));
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert_eq!(normalize_tag_name(""), None);
        assert_eq!(normalize_tag_name(" \t\n"), None);
    }
}
