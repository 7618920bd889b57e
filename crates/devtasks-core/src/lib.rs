//! # devtasks-core
//!
//! Core storage layer for DevTasks - shared by every front end.
//!
//! This crate provides:
//! - Database handle and schema lifecycle (`db` module)
//! - Data models (`models` module)
//! - Repositories, timer engine, search and data transfer (`services` module)
//! - Unified error handling (`error` module)

pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

// Re-exports for convenience
pub use db::{Database, DatabaseConfig, SchemaReport};
pub use error::{Error, Result};
pub use store::Store;

// Re-export commonly used types from models
pub use models::{
    BackupInfo, CategoryCount, ExportDocument, HitKind, ImportOutcome, ImportSummary, NewTask,
    Project, ProjectStats, SearchHit, Subtask, Tag, Task, TaskCategory, TaskPriority, TaskStatus,
    TaskTag, TaskWithStats, TimeLog,
};

// Re-export commonly used types from services
pub use services::{
    BackupService, DataTransfer, ProjectRepository, Search, StatsService, SubtaskRepository,
    TagManager, TaskRepository, TimerEngine,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_version_format() {
        let v = version();
        // Should be semver format: x.y.z
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "Version should be in x.y.z format");
    }
}
