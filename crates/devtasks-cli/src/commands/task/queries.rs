//! Task query commands
//!
//! Read operations for tasks.

use anyhow::Result;
use devtasks_core::{TaskStatus, TaskWithStats};

use super::helpers::{parse_choice, require_task};
use super::types::TaskRow;
use crate::commands::Context;
use crate::output::{format_timestamp, print_info, print_json, print_output, print_single, OutputFormat};

/// Print tasks as rows, or as full records in JSON mode
pub fn print_tasks(ctx: &Context, tasks: Vec<TaskWithStats>) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => print_json(&tasks),
        OutputFormat::Table => {
            let rows: Vec<TaskRow> = tasks.into_iter().map(TaskRow::from).collect();
            print_output(&rows, ctx.format)
        }
    }
}

pub async fn list_tasks(ctx: &Context, project: i64, status: Option<String>) -> Result<()> {
    let status = status.as_deref().map(parse_choice::<TaskStatus>).transpose()?;

    let mut tasks = ctx.store.get_tasks(Some(project)).await?;
    if let Some(status) = status {
        tasks.retain(|t| t.task.status == status);
    }

    print_tasks(ctx, tasks)
}

pub async fn show_task(ctx: &Context, id: i64) -> Result<()> {
    let item = require_task(ctx, id).await?;
    let tags = ctx.store.get_task_tags(id).await?;
    let subtasks = ctx.store.get_subtasks(id).await?;

    if ctx.format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "task": item,
            "tags": tags,
            "subtasks": subtasks,
        }));
    }

    let description = item.task.description.clone();
    let local_path = item.task.local_path.clone();
    let created_at = item.task.created_at.clone();
    print_single(&TaskRow::from(item), ctx.format)?;

    if let Some(description) = description.filter(|d| !d.is_empty()) {
        print_info(&format!("\n{}", description), false);
    }
    if let Some(path) = local_path {
        print_info(&format!("Path: {}", path), false);
    }
    print_info(&format!("Created: {}", format_timestamp(&created_at)), false);

    if !tags.is_empty() {
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        print_info(&format!("Tags: {}", names.join(", ")), false);
    }

    if !subtasks.is_empty() {
        print_info("Subtasks:", false);
        for s in &subtasks {
            let mark = if s.is_completed { "x" } else { " " };
            print_info(&format!("  [{}] #{} {}", mark, s.id, s.title), false);
        }
    }

    Ok(())
}
