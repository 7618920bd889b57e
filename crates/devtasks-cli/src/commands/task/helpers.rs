//! Task helper functions
//!
//! Shared utilities for task, subtask, tag and timer commands.

use anyhow::Result;
use chrono::NaiveDate;
use devtasks_core::TaskWithStats;

use crate::commands::Context;

/// Truncate string to max characters with ellipsis
pub fn truncate(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = chars[..max_chars - 3].iter().collect();
        format!("{}...", truncated)
    }
}

/// Parse date string supporting common formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    if s == "today" {
        return Ok(chrono::Local::now().date_naive());
    }
    if s == "tomorrow" {
        return Ok(chrono::Local::now().date_naive() + chrono::Duration::days(1));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date format: {}. Use YYYY-MM-DD", s))
}

/// Parse a status/priority/category flag into its core enum
pub fn parse_choice<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = devtasks_core::Error>,
{
    Ok(value.parse::<T>()?)
}

/// Load a task or fail with a not-found error
pub async fn require_task(ctx: &Context, id: i64) -> Result<TaskWithStats> {
    ctx.store
        .tasks
        .get(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
}
