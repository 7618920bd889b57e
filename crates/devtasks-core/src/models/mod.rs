//! Data models for the DevTasks store

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::utils::{duration_seconds, parse_due_date, parse_timestamp};

/// Default color for projects created from a folder
pub const DEFAULT_PROJECT_COLOR: &str = "#3b82f6";

/// Default color for lazily created tags
pub const DEFAULT_TAG_COLOR: &str = "#007acc";

/// Name of the project seeded on first run
pub const DEFAULT_PROJECT_NAME: &str = "Default Workspace";

// Export documents written by older releases carry raw column values:
// flags as 0/1 or null, cleared dates as "", and nulls for defaulted columns.

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn project_color<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()))
}

fn lenient_due_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .as_deref()
        .and_then(parse_due_date))
}

fn flag_from_any<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        None => false,
    })
}

fn flag_as_int<S>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

/// Project model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "project_color")]
    pub color: String,
    pub path: Option<String>, // NULL for the default workspace
    pub created_at: String,
}

/// Task status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        }
    }

    /// High and critical tasks are surfaced separately on the dashboard
    pub fn is_urgent(&self) -> bool {
        matches!(self, TaskPriority::High | TaskPriority::Critical)
    }
}

/// Task category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum TaskCategory {
    #[default]
    Feature,
    Bug,
    Refactor,
    Devops,
    Research,
    Testing,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 6] = [
        TaskCategory::Feature,
        TaskCategory::Bug,
        TaskCategory::Refactor,
        TaskCategory::Devops,
        TaskCategory::Research,
        TaskCategory::Testing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Feature => "feature",
            TaskCategory::Bug => "bug",
            TaskCategory::Refactor => "refactor",
            TaskCategory::Devops => "devops",
            TaskCategory::Research => "research",
            TaskCategory::Testing => "testing",
        }
    }
}

macro_rules! impl_text_enum {
    ($ty:ty, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = <$ty>::ALL.iter().map(|v| v.as_str()).collect();
                        Error::validation(format!(
                            "Invalid {}: {}. Use one of: {}",
                            $label,
                            s,
                            allowed.join(", ")
                        ))
                    })
            }
        }
    };
}

impl_text_enum!(TaskStatus, "status");
impl_text_enum!(TaskPriority, "priority");
impl_text_enum!(TaskCategory, "category");

/// Task model, one row of the `tasks` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: TaskPriority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: TaskCategory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estimated_hours: f64,
    #[serde(default, deserialize_with = "lenient_due_date")]
    pub due_date: Option<NaiveDate>,
    pub local_path: Option<String>,
    pub timer_start: Option<String>, // ISO 8601, set while a session is open
    pub created_at: String,
}

impl Task {
    pub fn is_running(&self) -> bool {
        self.timer_start.is_some()
    }
}

/// Task enriched with aggregates computed from `time_logs` and `subtasks`
/// at query time. None of these values are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TaskWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub total_logged: i64,
    pub total_subtasks: i64,
    pub completed_subtasks: i64,
}

impl TaskWithStats {
    /// Wrap a freshly created task; it has no logs and no subtasks yet.
    pub fn fresh(task: Task) -> Self {
        Self {
            task,
            total_logged: 0,
            total_subtasks: 0,
            completed_subtasks: 0,
        }
    }

    /// Fraction of completed subtasks, 0.0 when there are none
    pub fn subtask_progress(&self) -> f64 {
        if self.total_subtasks > 0 {
            self.completed_subtasks as f64 / self.total_subtasks as f64
        } else {
            0.0
        }
    }

    /// Logged seconds plus the open session, if any, measured at `now`.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        let running = self
            .task
            .timer_start
            .as_deref()
            .and_then(parse_timestamp)
            .map(|start| duration_seconds(start, now))
            .unwrap_or(0);
        self.total_logged + running
    }
}

/// Options for creating a task.
///
/// Every optional field has a default: status `todo`, priority `medium`,
/// category `feature`, no description, no due date, `estimated_hours = 0`,
/// no local path and no tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub project_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub local_path: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(project_id: i64, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            category: TaskCategory::default(),
            estimated_hours: 0.0,
            due_date: None,
            local_path: None,
            tags: Vec::new(),
        }
    }
}

/// Subtask (checklist item) model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    #[serde(default, serialize_with = "flag_as_int", deserialize_with = "flag_from_any")]
    pub is_completed: bool,
    pub created_at: Option<String>,
}

/// Tag model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}

/// Task/tag association row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TaskTag {
    pub task_id: i64,
    pub tag_id: i64,
}

/// One completed timer session. Written once by the stop transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TimeLog {
    pub id: i64,
    pub task_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub duration_seconds: i64,
    pub created_at: Option<String>,
}

/// What a search hit points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum HitKind {
    Task,
    Subtask,
}

/// Search result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SearchHit {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: HitKind,
    /// Task to open: the hit itself, or the owning task of a subtask
    pub task_id: i64,
    /// Owning task's title, only for subtask hits
    pub parent_title: Option<String>,
}

/// Dashboard aggregates for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub project_id: i64,
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64, // in-progress + review
    pub done: i64,
    pub progress_percent: i64,
    pub high_priority: i64,
    pub by_category: Vec<CategoryCount>,
    pub total_logged: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: TaskCategory,
    pub count: i64,
}

/// Portable whole-store document produced by export and consumed by import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: i64,
    pub date: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub task_tags: Vec<TaskTag>,
    #[serde(default)]
    pub time_logs: Vec<TimeLog>,
}

/// Row counts written by a successful import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub projects: usize,
    pub tasks: usize,
    pub subtasks: usize,
    pub tags: usize,
    pub task_tags: usize,
    pub time_logs: usize,
}

/// `{success, error?}` payload returned to collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ImportSummary>,
}

/// Result of a completed backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupInfo {
    pub path: String,
    pub bytes: u64,
}
