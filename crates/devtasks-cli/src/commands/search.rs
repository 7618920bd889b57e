//! Search command

use anyhow::Result;
use clap::Args;
use devtasks_core::{HitKind, SearchHit};
use serde::Serialize;
use tabled::Tabled;

use super::task::helpers::truncate;
use super::task::DEFAULT_PROJECT_ID;
use super::Context;
use crate::output::{print_info, print_output};

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for in task and subtask titles (at least 2 characters)
    pub term: String,

    /// Project ID
    #[arg(short, long, default_value_t = DEFAULT_PROJECT_ID)]
    pub project: i64,
}

/// Search hit row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct HitRow {
    #[tabled(rename = "Type")]
    #[serde(rename = "type")]
    pub kind: String,
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Task")]
    pub task_id: i64,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "In")]
    pub parent: String,
}

impl From<SearchHit> for HitRow {
    fn from(hit: SearchHit) -> Self {
        Self {
            kind: match hit.kind {
                HitKind::Task => "task".to_string(),
                HitKind::Subtask => "subtask".to_string(),
            },
            id: hit.id,
            task_id: hit.task_id,
            title: truncate(&hit.title, 50),
            parent: hit.parent_title.unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub async fn execute(ctx: &Context, args: SearchArgs) -> Result<()> {
    if args.term.trim().chars().count() < devtasks_core::services::MIN_TERM_CHARS {
        print_info(
            &format!(
                "Search terms need at least {} characters",
                devtasks_core::services::MIN_TERM_CHARS
            ),
            ctx.quiet,
        );
    }

    let rows: Vec<HitRow> = ctx
        .store
        .search_all(Some(args.project), &args.term)
        .await?
        .into_iter()
        .map(HitRow::from)
        .collect();
    print_output(&rows, ctx.format)
}
