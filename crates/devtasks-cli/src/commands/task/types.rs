//! Task types
//!
//! Types for task commands.

use clap::Subcommand;
use devtasks_core::TaskWithStats;
use serde::Serialize;
use tabled::Tabled;

use super::helpers::truncate;
use crate::output::format_duration;

/// Project tasks land in when `--project` is not given
pub const DEFAULT_PROJECT_ID: i64 = 1;

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks of a project, newest first
    List {
        /// Project ID
        #[arg(short, long, default_value_t = DEFAULT_PROJECT_ID)]
        project: i64,

        /// Only show tasks with this status (todo, in-progress, review, done)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Add a new task
    Add {
        /// Project ID
        #[arg(short, long, default_value_t = DEFAULT_PROJECT_ID)]
        project: i64,

        /// Task title
        #[arg(short, long)]
        title: String,

        /// Description
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// Status (todo, in-progress, review, done)
        #[arg(short, long)]
        status: Option<String>,

        /// Priority (low, medium, high, critical)
        #[arg(short = 'P', long)]
        priority: Option<String>,

        /// Category (feature, bug, refactor, devops, research, testing)
        #[arg(short, long)]
        category: Option<String>,

        /// Estimated hours
        #[arg(short = 'H', long, default_value = "0")]
        hours: f64,

        /// Due date (YYYY-MM-DD, today, tomorrow)
        #[arg(short, long)]
        due: Option<String>,

        /// Local folder or file the task refers to
        #[arg(long)]
        path: Option<String>,

        /// Tag to attach; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Update an existing task
    Update {
        /// Task ID
        id: i64,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// New status
        #[arg(short, long)]
        status: Option<String>,

        /// New priority
        #[arg(short = 'P', long)]
        priority: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New estimated hours
        #[arg(short = 'H', long)]
        hours: Option<f64>,

        /// New due date (YYYY-MM-DD, today, tomorrow)
        #[arg(short, long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// New local path
        #[arg(long)]
        path: Option<String>,
    },

    /// Delete a task with its subtasks, tag links and time logs
    Delete {
        /// Task ID
        id: i64,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show task details
    Show {
        /// Task ID
        id: i64,
    },
}

/// Task row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct TaskRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Priority")]
    pub priority: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Due")]
    pub due: String,
    #[tabled(rename = "Est.")]
    pub estimate: String,
    #[tabled(rename = "Logged")]
    pub logged: String,
    #[tabled(rename = "Subtasks")]
    pub subtasks: String,
    #[tabled(rename = "Timer")]
    pub timer: String,
}

impl From<TaskWithStats> for TaskRow {
    fn from(item: TaskWithStats) -> Self {
        let running = item.task.is_running();
        Self {
            id: item.task.id,
            title: truncate(&item.task.title, 40),
            status: item.task.status.to_string(),
            priority: item.task.priority.to_string(),
            category: item.task.category.to_string(),
            due: item
                .task
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            estimate: format!("{:.1}h", item.task.estimated_hours),
            logged: format_duration(item.total_logged),
            subtasks: format!("{}/{}", item.completed_subtasks, item.total_subtasks),
            timer: if running { "running".to_string() } else { "-".to_string() },
        }
    }
}
