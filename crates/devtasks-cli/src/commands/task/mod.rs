//! Task commands
//!
//! Commands for managing tasks: list, add, update, delete, show.

pub mod helpers;
mod mutations;
mod queries;
mod types;

use anyhow::Result;

use crate::commands::Context;

// Re-export public types
pub use types::{TaskAction, DEFAULT_PROJECT_ID};

use mutations::{AddTaskArgs, UpdateTaskArgs};

pub async fn execute(ctx: &Context, action: TaskAction) -> Result<()> {
    match action {
        TaskAction::List { project, status } => queries::list_tasks(ctx, project, status).await,
        TaskAction::Add {
            project,
            title,
            description,
            status,
            priority,
            category,
            hours,
            due,
            path,
            tags,
        } => {
            let args = AddTaskArgs {
                project,
                title,
                description,
                status,
                priority,
                category,
                hours,
                due,
                path,
                tags,
            };
            mutations::add_task(ctx, args).await
        }
        TaskAction::Update {
            id,
            title,
            description,
            status,
            priority,
            category,
            hours,
            due,
            clear_due,
            path,
        } => {
            let args = UpdateTaskArgs {
                title,
                description,
                status,
                priority,
                category,
                hours,
                due,
                clear_due,
                path,
            };
            mutations::update_task(ctx, id, args).await
        }
        TaskAction::Delete { id, force } => mutations::delete_task(ctx, id, force).await,
        TaskAction::Show { id } => queries::show_task(ctx, id).await,
    }
}
