//! Operation surface consumed by front ends
//!
//! `Store` wires every component to one shared [`Database`] and exposes the
//! operations a UI calls. Components stay reachable as public fields for
//! callers that need the richer return types.

use std::path::{Path, PathBuf};

use crate::db::Database;
use crate::error::Result;
use crate::models::{
    BackupInfo, ExportDocument, ImportOutcome, NewTask, Project, ProjectStats, SearchHit, Subtask,
    Tag, Task, TaskWithStats, TimeLog,
};
use crate::services::{
    select_folder, BackupService, DataTransfer, ProjectRepository, Search, StatsService,
    SubtaskRepository, TagManager, TaskRepository, TimerEngine,
};

#[derive(Clone)]
pub struct Store {
    pub db: Database,
    pub projects: ProjectRepository,
    pub tasks: TaskRepository,
    pub subtasks: SubtaskRepository,
    pub tags: TagManager,
    pub timer: TimerEngine,
    pub search: Search,
    pub stats: StatsService,
    pub transfer: DataTransfer,
    pub backup: BackupService,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self {
            projects: ProjectRepository::new(db.clone()),
            tasks: TaskRepository::new(db.clone()),
            subtasks: SubtaskRepository::new(db.clone()),
            tags: TagManager::new(db.clone()),
            timer: TimerEngine::new(db.clone()),
            search: Search::new(db.clone()),
            stats: StatsService::new(db.clone()),
            transfer: DataTransfer::new(db.clone()),
            backup: BackupService::new(db.clone()),
            db,
        }
    }

    /// Open the store at `path`, running schema setup.
    pub async fn open(path: PathBuf) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?))
    }

    // --- Projects ---

    pub fn select_folder(&self, candidate: &Path) -> Option<PathBuf> {
        select_folder(candidate)
    }

    pub async fn open_project(&self, path: &str) -> Result<Project> {
        self.projects.open(path).await
    }

    pub async fn get_recent_projects(&self) -> Result<Vec<Project>> {
        self.projects.recent().await
    }

    pub async fn get_project_stats(&self, project_id: i64) -> Result<ProjectStats> {
        self.stats.project_stats(project_id).await
    }

    // --- Tasks ---

    pub async fn get_tasks(&self, project_id: Option<i64>) -> Result<Vec<TaskWithStats>> {
        self.tasks.list(project_id).await
    }

    pub async fn add_task(&self, new_task: NewTask) -> Result<TaskWithStats> {
        self.tasks.create(new_task).await
    }

    pub async fn update_task(&self, task: &Task) -> Result<Option<TaskWithStats>> {
        self.tasks.update(task).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<bool> {
        self.tasks.delete(id).await
    }

    // --- Subtasks ---

    pub async fn get_subtasks(&self, task_id: i64) -> Result<Vec<Subtask>> {
        self.subtasks.list(task_id).await
    }

    pub async fn add_subtask(&self, task_id: i64, title: &str) -> Result<Subtask> {
        self.subtasks.add(task_id, title).await
    }

    pub async fn toggle_subtask(&self, id: i64, is_completed: bool) -> Result<bool> {
        self.subtasks.toggle(id, is_completed).await
    }

    pub async fn delete_subtask(&self, id: i64) -> Result<bool> {
        self.subtasks.delete(id).await
    }

    // --- Tags ---

    pub async fn get_tags(&self) -> Result<Vec<Tag>> {
        self.tags.list().await
    }

    pub async fn create_tag(&self, name: &str) -> Result<Tag> {
        self.tags.create(name).await
    }

    pub async fn link_tag(&self, task_id: i64, tag_id: i64) -> Result<bool> {
        self.tags.link(task_id, tag_id).await
    }

    pub async fn unlink_tag(&self, task_id: i64, tag_id: i64) -> Result<bool> {
        self.tags.unlink(task_id, tag_id).await
    }

    pub async fn get_task_tags(&self, task_id: i64) -> Result<Vec<Tag>> {
        self.tags.task_tags(task_id).await
    }

    // --- Timer ---

    /// Start timestamp of the open session; `None` for an unknown task.
    pub async fn start_timer(&self, task_id: i64) -> Result<Option<String>> {
        self.timer.start(task_id).await
    }

    /// `true` when a session was closed, `false` when the timer was idle.
    pub async fn stop_timer(&self, task_id: i64) -> Result<bool> {
        Ok(self.timer.stop(task_id).await?.is_some())
    }

    pub async fn get_time_logs(&self, task_id: i64) -> Result<Vec<TimeLog>> {
        self.timer.time_logs(task_id).await
    }

    // --- Search ---

    pub async fn search_all(&self, project_id: Option<i64>, term: &str) -> Result<Vec<SearchHit>> {
        self.search.search_all(project_id, term).await
    }

    // --- Data management ---

    pub async fn export_data(&self) -> Result<ExportDocument> {
        self.transfer.export().await
    }

    pub async fn import_data(&self, document: &ExportDocument) -> ImportOutcome {
        self.transfer.import_data(document).await
    }

    pub async fn backup(&self, dest: &Path) -> Result<BackupInfo> {
        self.backup.backup(dest).await
    }

    pub async fn backup_db(&self, dest: &Path) -> bool {
        self.backup.backup_db(dest).await
    }
}
