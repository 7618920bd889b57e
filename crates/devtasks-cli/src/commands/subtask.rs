//! Subtask commands

use anyhow::Result;
use clap::Subcommand;
use devtasks_core::Subtask;
use serde::Serialize;
use tabled::Tabled;

use super::task::helpers::{require_task, truncate};
use super::Context;
use crate::output::{print_error, print_output, print_success};

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// List a task's subtasks in creation order
    List {
        /// Task ID
        task_id: i64,
    },

    /// Add a subtask to a task
    Add {
        /// Task ID
        task_id: i64,

        /// Subtask title
        title: String,
    },

    /// Mark a subtask done (or open again with --reopen)
    Toggle {
        /// Subtask ID
        id: i64,

        /// Mark the subtask as not completed
        #[arg(long)]
        reopen: bool,
    },

    /// Delete a subtask
    Delete {
        /// Subtask ID
        id: i64,
    },
}

/// Subtask row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct SubtaskRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Task")]
    pub task_id: i64,
    #[tabled(rename = "Done")]
    pub done: String,
    #[tabled(rename = "Title")]
    pub title: String,
}

impl From<Subtask> for SubtaskRow {
    fn from(s: Subtask) -> Self {
        Self {
            id: s.id,
            task_id: s.task_id,
            done: if s.is_completed { "x".to_string() } else { " ".to_string() },
            title: truncate(&s.title, 60),
        }
    }
}

pub async fn execute(ctx: &Context, action: SubtaskAction) -> Result<()> {
    match action {
        SubtaskAction::List { task_id } => {
            require_task(ctx, task_id).await?;
            let rows: Vec<SubtaskRow> = ctx
                .store
                .get_subtasks(task_id)
                .await?
                .into_iter()
                .map(SubtaskRow::from)
                .collect();
            print_output(&rows, ctx.format)
        }
        SubtaskAction::Add { task_id, title } => {
            let subtask = ctx.store.add_subtask(task_id, &title).await?;
            print_success(&format!("Added subtask: {}", subtask.id), ctx.quiet);
            Ok(())
        }
        SubtaskAction::Toggle { id, reopen } => {
            if ctx.store.toggle_subtask(id, !reopen).await? {
                let state = if reopen { "open" } else { "done" };
                print_success(&format!("Subtask {} marked {}", id, state), ctx.quiet);
            } else {
                print_error(&format!("Subtask not found: {}", id));
            }
            Ok(())
        }
        SubtaskAction::Delete { id } => {
            if ctx.store.delete_subtask(id).await? {
                print_success(&format!("Deleted subtask: {}", id), ctx.quiet);
            } else {
                print_error(&format!("Subtask not found: {}", id));
            }
            Ok(())
        }
    }
}
