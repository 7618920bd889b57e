//! Project commands
//!
//! A project is a local folder; opening the same folder twice yields the
//! same project.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use devtasks_core::Project;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{format_timestamp, print_output, print_single, print_success};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Open a folder as a project, creating it on first use
    Open {
        /// Folder to open (defaults to the current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Most recently created folder projects
    Recent,

    /// List every project
    List,
}

/// Project row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ProjectRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Color")]
    pub color: String,
    #[tabled(rename = "Created")]
    pub created_at: String,
}

impl From<Project> for ProjectRow {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            path: p.path.unwrap_or_else(|| "-".to_string()),
            color: p.color,
            created_at: format_timestamp(&p.created_at),
        }
    }
}

pub async fn execute(ctx: &Context, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::Open { path } => open_project(ctx, path).await,
        ProjectAction::Recent => {
            let projects = ctx.store.get_recent_projects().await?;
            print_projects(ctx, projects)
        }
        ProjectAction::List => {
            let projects = ctx.store.projects.list().await?;
            print_projects(ctx, projects)
        }
    }
}

async fn open_project(ctx: &Context, path: String) -> Result<()> {
    let candidate = PathBuf::from(shellexpand::tilde(&path).into_owned());
    let folder = ctx
        .store
        .select_folder(&candidate)
        .ok_or_else(|| anyhow::anyhow!("Not a directory: {}", path))?;

    let project = ctx.store.open_project(&folder.display().to_string()).await?;
    print_success(&format!("Opened project: {} ({})", project.name, project.id), ctx.quiet);

    if !ctx.quiet {
        print_single(&ProjectRow::from(project), ctx.format)?;
    }
    Ok(())
}

fn print_projects(ctx: &Context, projects: Vec<Project>) -> Result<()> {
    let rows: Vec<ProjectRow> = projects.into_iter().map(ProjectRow::from).collect();
    print_output(&rows, ctx.format)
}
