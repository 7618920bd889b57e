//! Data management commands
//!
//! Whole-store export, destructive import and raw database backup.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use devtasks_core::{DataTransfer, ImportSummary};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{print_error, print_info, print_json, print_output, print_success, OutputFormat};

#[derive(Subcommand)]
pub enum DataAction {
    /// Export every table to a JSON document
    Export {
        /// Output file
        path: String,
    },

    /// Replace ALL data with the contents of an export document
    Import {
        /// Export document to read
        path: String,

        /// Confirm replacing the current data
        #[arg(short, long)]
        force: bool,
    },

    /// Copy the database file
    Backup {
        /// Destination file
        path: String,
    },
}

/// Per-table row count for table display
#[derive(Debug, Serialize, Tabled)]
pub struct CountRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Rows")]
    pub rows: usize,
}

fn count_rows(summary: &ImportSummary) -> Vec<CountRow> {
    [
        ("projects", summary.projects),
        ("tasks", summary.tasks),
        ("subtasks", summary.subtasks),
        ("tags", summary.tags),
        ("task_tags", summary.task_tags),
        ("time_logs", summary.time_logs),
    ]
    .into_iter()
    .map(|(table, rows)| CountRow {
        table: table.to_string(),
        rows,
    })
    .collect()
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

pub async fn execute(ctx: &Context, action: DataAction) -> Result<()> {
    match action {
        DataAction::Export { path } => export_data(ctx, expand(&path)).await,
        DataAction::Import { path, force } => import_data(ctx, expand(&path), force).await,
        DataAction::Backup { path } => backup_data(ctx, expand(&path)).await,
    }
}

async fn export_data(ctx: &Context, path: PathBuf) -> Result<()> {
    let document = ctx.store.transfer.export_to_file(&path).await?;
    log::debug!("Exported {} tasks to {}", document.tasks.len(), path.display());
    print_success(&format!("Exported to {}", path.display()), ctx.quiet);

    if !ctx.quiet {
        let summary = ImportSummary {
            projects: document.projects.len(),
            tasks: document.tasks.len(),
            subtasks: document.subtasks.len(),
            tags: document.tags.len(),
            task_tags: document.task_tags.len(),
            time_logs: document.time_logs.len(),
        };
        print_output(&count_rows(&summary), ctx.format)?;
    }
    Ok(())
}

async fn import_data(ctx: &Context, path: PathBuf, force: bool) -> Result<()> {
    if !force {
        // Validate the document and describe what would be replaced
        let document = DataTransfer::read_document(&path).await?;
        print_info(
            &format!(
                "{} (version {}, exported {}) holds {} projects and {} tasks",
                path.display(),
                document.version,
                document.date,
                document.projects.len(),
                document.tasks.len()
            ),
            ctx.quiet,
        );
        print_error("Import replaces ALL current data. Use --force to confirm");
        return Ok(());
    }

    let outcome = ctx.store.transfer.import_file(&path).await;
    if ctx.format == OutputFormat::Json {
        print_json(&outcome)?;
    }

    match (outcome.success, outcome.summary) {
        (true, Some(summary)) => {
            print_success(&format!("Imported {}", path.display()), ctx.quiet);
            if ctx.format == OutputFormat::Table && !ctx.quiet {
                print_output(&count_rows(&summary), ctx.format)?;
            }
            Ok(())
        }
        _ => {
            let reason = outcome.error.unwrap_or_else(|| "unknown error".to_string());
            log::error!("Import of {} rolled back: {}", path.display(), reason);
            Err(anyhow::anyhow!("Import failed, data left unchanged: {}", reason))
        }
    }
}

async fn backup_data(ctx: &Context, path: PathBuf) -> Result<()> {
    let info = ctx
        .store
        .backup(&path)
        .await
        .inspect_err(|e| log::error!("Backup to {} failed: {}", path.display(), e))?;
    print_success(
        &format!("Backed up database to {} ({} bytes)", info.path, info.bytes),
        ctx.quiet,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_rows_covers_every_table() {
        let summary = ImportSummary {
            tasks: 4,
            ..Default::default()
        };
        let rows = count_rows(&summary);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].table, "tasks");
        assert_eq!(rows[1].rows, 4);
    }
}
