//! Services module
//!
//! Each component owns a clone of the [`Database`](crate::db::Database)
//! handle it was constructed with.

pub mod backup;
pub mod projects;
pub mod search;
pub mod stats;
pub mod subtasks;
pub mod tags;
pub mod tasks;
pub mod timer;
pub mod transfer;

pub use backup::BackupService;
pub use projects::{folder_name, select_folder, ProjectRepository, RECENT_PROJECTS_LIMIT};
pub use search::{Search, MIN_TERM_CHARS, SEARCH_LIMIT};
pub use stats::{progress_percent, StatsService};
pub use subtasks::SubtaskRepository;
pub use tags::{normalize_tag_name, TagManager};
pub use tasks::TaskRepository;
pub use timer::TimerEngine;
pub use transfer::{DataTransfer, EXPORT_VERSION, SUPPORTED_VERSIONS};
