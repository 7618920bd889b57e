//! Timer commands

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use devtasks_core::TimeLog;
use serde::Serialize;
use tabled::Tabled;

use super::task::helpers::{require_task, truncate};
use super::Context;
use crate::output::{
    format_duration, format_timestamp, print_error, print_info, print_output, print_success,
    OutputFormat,
};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start timing a task (keeps the original start if already running)
    Start {
        /// Task ID
        task_id: i64,
    },

    /// Stop a running timer and log the session
    Stop {
        /// Task ID
        task_id: i64,
    },

    /// List logged sessions of a task, latest first
    Logs {
        /// Task ID
        task_id: i64,
    },

    /// Show running timers
    Status {
        /// Only timers in this project
        #[arg(short, long)]
        project: Option<i64>,
    },
}

/// Time log row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct TimeLogRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Start")]
    pub start: String,
    #[tabled(rename = "End")]
    pub end: String,
    #[tabled(rename = "Duration")]
    pub duration: String,
    #[serde(skip)]
    #[tabled(skip)]
    pub seconds: i64,
}

impl From<TimeLog> for TimeLogRow {
    fn from(log: TimeLog) -> Self {
        Self {
            id: log.id,
            start: format_timestamp(&log.start_time),
            end: format_timestamp(&log.end_time),
            duration: format_duration(log.duration_seconds),
            seconds: log.duration_seconds,
        }
    }
}

/// Running timer row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct RunningRow {
    #[tabled(rename = "Task")]
    pub task_id: i64,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Since")]
    pub since: String,
    #[tabled(rename = "Elapsed")]
    pub elapsed: String,
}

pub async fn execute(ctx: &Context, action: TimerAction) -> Result<()> {
    match action {
        TimerAction::Start { task_id } => match ctx.store.start_timer(task_id).await? {
            Some(started) => {
                print_success(
                    &format!("Timer running for task {} since {}", task_id, format_timestamp(&started)),
                    ctx.quiet,
                );
                Ok(())
            }
            None => Err(anyhow::anyhow!("Task not found: {}", task_id)),
        },
        TimerAction::Stop { task_id } => match ctx.store.timer.stop(task_id).await? {
            Some(log) => {
                print_success(
                    &format!(
                        "Stopped timer for task {}: {}",
                        task_id,
                        format_duration(log.duration_seconds)
                    ),
                    ctx.quiet,
                );
                Ok(())
            }
            None => {
                print_error(&format!("No running timer for task {}", task_id));
                Ok(())
            }
        },
        TimerAction::Logs { task_id } => {
            require_task(ctx, task_id).await?;
            let rows: Vec<TimeLogRow> = ctx
                .store
                .get_time_logs(task_id)
                .await?
                .into_iter()
                .map(TimeLogRow::from)
                .collect();
            print_output(&rows, ctx.format)?;

            if ctx.format == OutputFormat::Table && !rows.is_empty() {
                let total: i64 = rows.iter().map(|r| r.seconds).sum();
                print_info(&format!("Total: {}", format_duration(total)), ctx.quiet);
            }
            Ok(())
        }
        TimerAction::Status { project } => {
            let now = Utc::now();
            let mut rows = Vec::new();
            for task in ctx.store.timer.running(project).await? {
                let elapsed = ctx.store.timer.elapsed_at(task.id, now).await?.unwrap_or(0);
                let since = task.timer_start.clone().unwrap_or_default();
                rows.push(RunningRow {
                    task_id: task.id,
                    title: truncate(&task.title, 40),
                    since: format_timestamp(&since),
                    elapsed: format_duration(elapsed),
                });
            }
            print_output(&rows, ctx.format)
        }
    }
}
