//! DevTasks CLI - local-first task tracking
//!
//! A command-line front end for projects, tasks, subtasks, tags, timers
//! and whole-store export, import and backup.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use devtasks_core::{Database, Store};

#[derive(Parser)]
#[command(name = "devtasks")]
#[command(author, version, about = "Local-first task tracking CLI", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Override database path (or set DEVTASKS_DB_PATH env var)
    #[arg(long, env = "DEVTASKS_DB_PATH", global = true)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open and list project folders
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },

    /// Manage a task's checklist
    Subtask {
        #[command(subcommand)]
        action: commands::subtask::SubtaskAction,
    },

    /// Manage tags and task/tag links
    Tag {
        #[command(subcommand)]
        action: commands::tag::TagAction,
    },

    /// Start and stop task timers
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },

    /// Search task and subtask titles in a project
    Search(commands::search::SearchArgs),

    /// Project dashboard statistics
    Stats(commands::stats::StatsArgs),

    /// Export, import and back up the whole store
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Initialize database
    let db = match &cli.db {
        Some(path) => Database::open(PathBuf::from(shellexpand::tilde(path).into_owned())).await?,
        None => Database::new().await?,
    };

    // Create context for commands
    let ctx = commands::Context {
        store: Store::new(db),
        format: cli.format,
        quiet: cli.quiet,
    };

    // Execute command
    match cli.command {
        Commands::Project { action } => commands::project::execute(&ctx, action).await,
        Commands::Task { action } => commands::task::execute(&ctx, action).await,
        Commands::Subtask { action } => commands::subtask::execute(&ctx, action).await,
        Commands::Tag { action } => commands::tag::execute(&ctx, action).await,
        Commands::Timer { action } => commands::timer::execute(&ctx, action).await,
        Commands::Search(args) => commands::search::execute(&ctx, args).await,
        Commands::Stats(args) => commands::stats::execute(&ctx, args).await,
        Commands::Data { action } => commands::data::execute(&ctx, action).await,
    }
}
