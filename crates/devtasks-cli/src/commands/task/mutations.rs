//! Task mutation commands
//!
//! Create, update, and delete operations for tasks.

use anyhow::Result;
use devtasks_core::{NewTask, TaskCategory, TaskPriority, TaskStatus};

use super::helpers::{parse_choice, parse_date, require_task};
use super::queries::print_tasks;
use super::types::TaskRow;
use crate::commands::Context;
use crate::output::{print_error, print_single, print_success};

/// Flags accepted by `task add`
pub struct AddTaskArgs {
    pub project: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub hours: f64,
    pub due: Option<String>,
    pub path: Option<String>,
    pub tags: Vec<String>,
}

/// Flags accepted by `task update`; `None` keeps the stored value
pub struct UpdateTaskArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub hours: Option<f64>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub path: Option<String>,
}

pub async fn add_task(ctx: &Context, args: AddTaskArgs) -> Result<()> {
    let mut new_task = NewTask::new(args.project, args.title);
    new_task.description = args.description;
    new_task.estimated_hours = args.hours;
    new_task.local_path = args.path;
    new_task.tags = args.tags;
    if let Some(s) = args.status {
        new_task.status = parse_choice::<TaskStatus>(&s)?;
    }
    if let Some(p) = args.priority {
        new_task.priority = parse_choice::<TaskPriority>(&p)?;
    }
    if let Some(c) = args.category {
        new_task.category = parse_choice::<TaskCategory>(&c)?;
    }
    if let Some(d) = args.due {
        new_task.due_date = Some(parse_date(&d)?);
    }

    let created = ctx.store.add_task(new_task).await?;

    print_success(&format!("Created task: {}", created.task.id), ctx.quiet);

    // Show the created task
    if !ctx.quiet {
        print_tasks(ctx, vec![created])?;
    }

    Ok(())
}

pub async fn update_task(ctx: &Context, id: i64, args: UpdateTaskArgs) -> Result<()> {
    let mut task = require_task(ctx, id).await?.task;

    if let Some(t) = args.title {
        task.title = t;
    }
    if let Some(d) = args.description {
        task.description = Some(d);
    }
    if let Some(s) = args.status {
        task.status = parse_choice(&s)?;
    }
    if let Some(p) = args.priority {
        task.priority = parse_choice(&p)?;
    }
    if let Some(c) = args.category {
        task.category = parse_choice(&c)?;
    }
    if let Some(h) = args.hours {
        task.estimated_hours = h;
    }
    if let Some(d) = args.due {
        task.due_date = Some(parse_date(&d)?);
    } else if args.clear_due {
        task.due_date = None;
    }
    if let Some(p) = args.path {
        task.local_path = Some(p);
    }

    let updated = ctx
        .store
        .update_task(&task)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    print_success(&format!("Updated task: {}", id), ctx.quiet);

    if !ctx.quiet {
        print_tasks(ctx, vec![updated])?;
    }

    Ok(())
}

pub async fn delete_task(ctx: &Context, id: i64, force: bool) -> Result<()> {
    let item = require_task(ctx, id).await?;

    if !force {
        // Show task before deletion
        print_single(&TaskRow::from(item), ctx.format)?;
        print_error("Use --force to confirm deletion");
        return Ok(());
    }

    ctx.store.delete_task(id).await?;

    print_success(&format!("Deleted task: {}", id), ctx.quiet);

    Ok(())
}
