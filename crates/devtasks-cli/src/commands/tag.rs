//! Tag commands
//!
//! Tags are referenced by name on the command line; `link` creates the tag
//! when it does not exist yet.

use anyhow::Result;
use clap::Subcommand;
use devtasks_core::Tag;
use serde::Serialize;
use tabled::Tabled;

use super::task::helpers::require_task;
use super::Context;
use crate::output::{print_error, print_info, print_output, print_single, print_success};

#[derive(Subcommand)]
pub enum TagAction {
    /// List all tags
    List,

    /// Create a tag (returns the existing one if the name is taken)
    Create {
        /// Tag name
        name: String,
    },

    /// Attach a tag to a task
    Link {
        /// Task ID
        task_id: i64,

        /// Tag name
        name: String,
    },

    /// Detach a tag from a task
    Unlink {
        /// Task ID
        task_id: i64,

        /// Tag name
        name: String,
    },

    /// Show the tags of a task
    Show {
        /// Task ID
        task_id: i64,
    },
}

/// Tag row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct TagRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Color")]
    pub color: String,
}

impl From<Tag> for TagRow {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            color: t.color.unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn to_rows(tags: Vec<Tag>) -> Vec<TagRow> {
    tags.into_iter().map(TagRow::from).collect()
}

pub async fn execute(ctx: &Context, action: TagAction) -> Result<()> {
    match action {
        TagAction::List => print_output(&to_rows(ctx.store.get_tags().await?), ctx.format),
        TagAction::Create { name } => {
            let tag = ctx.store.create_tag(&name).await?;
            print_success(&format!("Tag ready: {} ({})", tag.name, tag.id), ctx.quiet);
            if !ctx.quiet {
                print_single(&TagRow::from(tag), ctx.format)?;
            }
            Ok(())
        }
        TagAction::Link { task_id, name } => {
            require_task(ctx, task_id).await?;
            let tag = ctx.store.create_tag(&name).await?;
            if ctx.store.link_tag(task_id, tag.id).await? {
                print_success(&format!("Tagged task {} with {}", task_id, tag.name), ctx.quiet);
            } else {
                print_info(&format!("Task {} already tagged with {}", task_id, tag.name), ctx.quiet);
            }
            Ok(())
        }
        TagAction::Unlink { task_id, name } => {
            let unlinked = match ctx.store.tags.find_by_name(&name).await? {
                Some(tag) => ctx.store.unlink_tag(task_id, tag.id).await?,
                None => false,
            };
            if unlinked {
                print_success(&format!("Removed {} from task {}", name.trim(), task_id), ctx.quiet);
            } else {
                print_error(&format!("Task {} is not tagged with {}", task_id, name.trim()));
            }
            Ok(())
        }
        TagAction::Show { task_id } => {
            require_task(ctx, task_id).await?;
            print_output(&to_rows(ctx.store.get_task_tags(task_id).await?), ctx.format)
        }
    }
}
