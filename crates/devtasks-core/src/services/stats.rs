//! Project dashboard statistics

use std::collections::HashMap;

use crate::db::Database;
use crate::error::Result;
use crate::models::{CategoryCount, ProjectStats, TaskCategory, TaskPriority, TaskStatus};

/// Percentage of done tasks, rounded; 0 for an empty project.
pub fn progress_percent(done: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as i64
}

#[derive(Clone)]
pub struct StatsService {
    db: Database,
}

impl StatsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn project_stats(&self, project_id: i64) -> Result<ProjectStats> {
        let rows: Vec<(TaskStatus, TaskPriority, TaskCategory, i64)> = sqlx::query_as(
            r#"SELECT
                   COALESCE(status, 'todo') AS status,
                   COALESCE(priority, 'medium') AS priority,
                   COALESCE(category, 'feature') AS category,
                   COUNT(*) AS count
               FROM tasks
               WHERE project_id = ?
               GROUP BY 1, 2, 3"#,
        )
        .bind(project_id)
        .fetch_all(&self.db.pool)
        .await?;

        let (total_logged,): (i64,) = sqlx::query_as(
            r#"SELECT COALESCE(SUM(l.duration_seconds), 0)
               FROM time_logs l
               JOIN tasks t ON l.task_id = t.id
               WHERE t.project_id = ?"#,
        )
        .bind(project_id)
        .fetch_one(&self.db.pool)
        .await?;

        let mut by_status: HashMap<TaskStatus, i64> = HashMap::new();
        let mut by_category: HashMap<TaskCategory, i64> = HashMap::new();
        let mut high_priority = 0;
        for (status, priority, category, count) in rows {
            *by_status.entry(status).or_default() += count;
            *by_category.entry(category).or_default() += count;
            if priority.is_urgent() {
                high_priority += count;
            }
        }

        let count = |s: TaskStatus| by_status.get(&s).copied().unwrap_or(0);
        let total: i64 = by_status.values().sum();
        let done = count(TaskStatus::Done);

        Ok(ProjectStats {
            project_id,
            total,
            todo: count(TaskStatus::Todo),
            in_progress: count(TaskStatus::InProgress) + count(TaskStatus::Review),
            done,
            progress_percent: progress_percent(done, total),
            high_priority,
            by_category: TaskCategory::ALL
                .iter()
                .map(|c| CategoryCount {
                    category: *c,
                    count: by_category.get(c).copied().unwrap_or(0),
                })
                .collect(),
            total_logged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent_empty_project() {
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[test]
    fn test_progress_percent_rounds() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(4, 4), 100);
    }
}
