//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod data;
pub mod project;
pub mod search;
pub mod stats;
pub mod subtask;
pub mod tag;
pub mod task;
pub mod timer;

use crate::output::OutputFormat;
use devtasks_core::Store;

/// Shared context for all commands
pub struct Context {
    pub store: Store,
    pub format: OutputFormat,
    pub quiet: bool,
}
