//! Project statistics command

use anyhow::Result;
use clap::Args;
use devtasks_core::ProjectStats;
use serde::Serialize;
use tabled::Tabled;

use super::task::DEFAULT_PROJECT_ID;
use super::Context;
use crate::output::{format_duration, print_json, print_output, OutputFormat};

#[derive(Args)]
pub struct StatsArgs {
    /// Project ID
    #[arg(short, long, default_value_t = DEFAULT_PROJECT_ID)]
    pub project: i64,
}

/// Metric row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl MetricRow {
    fn new(metric: impl Into<String>, value: impl ToString) -> Self {
        Self {
            metric: metric.into(),
            value: value.to_string(),
        }
    }
}

/// Flatten stats into one metric per row
pub fn metric_rows(stats: &ProjectStats) -> Vec<MetricRow> {
    let mut rows = vec![
        MetricRow::new("Total tasks", stats.total),
        MetricRow::new("To do", stats.todo),
        MetricRow::new("In progress", stats.in_progress),
        MetricRow::new("Done", stats.done),
        MetricRow::new("Progress", format!("{}%", stats.progress_percent)),
        MetricRow::new("High priority", stats.high_priority),
        MetricRow::new("Time logged", format_duration(stats.total_logged)),
    ];
    for c in &stats.by_category {
        rows.push(MetricRow::new(format!("Category: {}", c.category), c.count));
    }
    rows
}

pub async fn execute(ctx: &Context, args: StatsArgs) -> Result<()> {
    let stats = ctx.store.get_project_stats(args.project).await?;

    match ctx.format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Table => print_output(&metric_rows(&stats), ctx.format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devtasks_core::{CategoryCount, TaskCategory};

    #[test]
    fn test_metric_rows() {
        let stats = ProjectStats {
            project_id: 1,
            total: 3,
            todo: 1,
            in_progress: 1,
            done: 1,
            progress_percent: 33,
            high_priority: 2,
            by_category: vec![CategoryCount {
                category: TaskCategory::Bug,
                count: 2,
            }],
            total_logged: 125,
        };

        let rows = metric_rows(&stats);
        assert_eq!(rows[0].value, "3");
        assert!(rows.iter().any(|r| r.metric == "Progress" && r.value == "33%"));
        assert!(rows.iter().any(|r| r.metric == "Time logged" && r.value == "2m 05s"));
        assert!(rows.iter().any(|r| r.metric == "Category: bug" && r.value == "2"));
    }
}
