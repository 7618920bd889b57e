//! Cross-entity search over task and subtask titles

use crate::db::Database;
use crate::error::Result;
use crate::models::SearchHit;

/// Maximum number of hits returned by one search
pub const SEARCH_LIMIT: i64 = 10;

/// Shortest term (in characters, after trimming) that triggers a search
pub const MIN_TERM_CHARS: usize = 2;

/// Escape LIKE wildcards so the term matches literally (`ESCAPE '\'`).
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Clone)]
pub struct Search {
    db: Database,
}

impl Search {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Case-insensitive substring search scoped to one project.
    ///
    /// Task hits come before subtask hits; no ranking beyond that. SQLite's
    /// `LOWER()` folds ASCII only, so terms with other characters are
    /// matched with Unicode case folding on this side instead.
    pub async fn search_all(&self, project_id: Option<i64>, term: &str) -> Result<Vec<SearchHit>> {
        let term = term.trim();
        let Some(project_id) = project_id else {
            return Ok(Vec::new());
        };
        if term.chars().count() < MIN_TERM_CHARS {
            return Ok(Vec::new());
        }

        if !term.is_ascii() {
            return self.search_folded(project_id, term).await;
        }

        let pattern = like_pattern(term);
        let hits = sqlx::query_as(&hits_sql(
            r"AND LOWER(t.title) LIKE LOWER(?2) ESCAPE '\'",
            r"AND LOWER(s.title) LIKE LOWER(?2) ESCAPE '\'",
            "LIMIT ?3",
        ))
        .bind(project_id)
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(hits)
    }

    async fn search_folded(&self, project_id: i64, term: &str) -> Result<Vec<SearchHit>> {
        let needle = term.to_lowercase();
        let candidates: Vec<SearchHit> = sqlx::query_as(&hits_sql("", "", ""))
            .bind(project_id)
            .fetch_all(&self.db.pool)
            .await?;

        Ok(candidates
            .into_iter()
            .filter(|hit| hit.title.to_lowercase().contains(&needle))
            .take(SEARCH_LIMIT as usize)
            .collect())
    }
}

/// Task hits then subtask hits for project `?1`, with optional title filters
/// and limit appended.
fn hits_sql(task_filter: &str, subtask_filter: &str, limit: &str) -> String {
    format!(
        r#"SELECT id, title, kind, task_id, parent_title FROM (
               SELECT t.id AS id, t.title AS title, 'task' AS kind, t.id AS task_id,
                      NULL AS parent_title, 0 AS grp
               FROM tasks t
               WHERE t.project_id = ?1 {}
               UNION ALL
               SELECT s.id, s.title, 'subtask', t.id, t.title, 1
               FROM subtasks s
               JOIN tasks t ON s.task_id = t.id
               WHERE t.project_id = ?1 {}
           )
           ORDER BY grp ASC, id ASC
           {}"#,
        task_filter, subtask_filter, limit
    )
}
