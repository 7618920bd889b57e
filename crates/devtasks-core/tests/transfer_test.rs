//! Integration tests for export/import and database backups

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{add_task, count_rows, create_test_store, DEFAULT_PROJECT};
use devtasks_core::{DataTransfer, Error, ExportDocument, NewTask, Store, TimeLog};

const TABLES: [&str; 6] = ["projects", "tasks", "subtasks", "tags", "task_tags", "time_logs"];

/// Two projects, tagged tasks, subtasks and a logged session
async fn populate(store: &Store) {
    let other = store.open_project("/work/api").await.unwrap();

    let mut new_task = NewTask::new(DEFAULT_PROJECT, "Ship release");
    new_task.tags = vec!["release".to_string(), "ops".to_string()];
    let task = store.add_task(new_task).await.unwrap().task;
    store.add_subtask(task.id, "tag build").await.unwrap();
    let done = store.add_subtask(task.id, "write notes").await.unwrap();
    store.toggle_subtask(done.id, true).await.unwrap();

    let t0 = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
    store.timer.start_at(task.id, t0).await.unwrap();
    store.timer.stop_at(task.id, t0 + Duration::seconds(90)).await.unwrap();

    store.add_task(NewTask::new(other.id, "Design endpoints")).await.unwrap();
}

async fn counts(store: &Store) -> Vec<i64> {
    let mut out = Vec::new();
    for table in TABLES {
        out.push(count_rows(store, table).await);
    }
    out
}

#[tokio::test]
async fn test_round_trip_preserves_ids_and_counts() {
    let (source, _src_dir) = create_test_store().await;
    populate(&source).await;
    // Leave a gap in task ids so id preservation is observable
    let gone = add_task(&source, "deleted").await.task;
    source.delete_task(gone.id).await.unwrap();
    add_task(&source, "after gap").await;

    let document = source.export_data().await.unwrap();
    assert_eq!(document.version, 1);
    assert!(!document.date.is_empty());

    let (target, _dst_dir) = create_test_store().await;
    add_task(&target, "will be replaced").await;

    let outcome = target.import_data(&document).await;
    assert!(outcome.success, "{:?}", outcome.error);
    let summary = outcome.summary.unwrap();
    assert_eq!(summary.tasks, document.tasks.len());

    assert_eq!(counts(&target).await, counts(&source).await);

    let again = target.export_data().await.unwrap();
    assert_eq!(again.projects, document.projects);
    assert_eq!(again.tasks, document.tasks);
    assert_eq!(again.subtasks, document.subtasks);
    assert_eq!(again.tags, document.tags);
    assert_eq!(again.task_tags, document.task_tags);
    assert_eq!(again.time_logs, document.time_logs);

    let tasks = target.get_tasks(Some(DEFAULT_PROJECT)).await.unwrap();
    let release = tasks.iter().find(|t| t.task.title == "Ship release").unwrap();
    assert_eq!(release.total_logged, 90);
    assert_eq!(release.total_subtasks, 2);
    assert_eq!(release.completed_subtasks, 1);
    assert!(tasks.iter().all(|t| t.task.id != gone.id));
}

#[tokio::test]
async fn test_import_is_all_or_nothing() {
    let (store, _dir) = create_test_store().await;
    populate(&store).await;
    let before = store.export_data().await.unwrap();

    let mut document = before.clone();
    document.tasks.retain(|t| t.title != "Design endpoints");
    document.time_logs.push(TimeLog {
        id: 500,
        task_id: 9_999,
        start_time: "2025-04-01T12:00:00.000Z".to_string(),
        end_time: "2025-04-01T12:00:10.000Z".to_string(),
        duration_seconds: 10,
        created_at: None,
    });

    let outcome = store.import_data(&document).await;
    assert!(!outcome.success);
    assert!(outcome.error.is_some());

    let after = store.export_data().await.unwrap();
    assert_eq!(after.tasks, before.tasks);
    assert_eq!(after.time_logs, before.time_logs);
    assert_eq!(after.task_tags, before.task_tags);
}

#[tokio::test]
async fn test_unsupported_version_fails_closed() {
    let (store, _dir) = create_test_store().await;
    populate(&store).await;
    let before = counts(&store).await;

    let mut document = store.export_data().await.unwrap();
    document.version = 2;
    document.tasks.clear();

    let err = store.transfer.import(&document).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedVersion(2)));
    assert_eq!(counts(&store).await, before);
}

#[tokio::test]
async fn test_absent_arrays_import_as_empty() {
    let (store, _dir) = create_test_store().await;
    populate(&store).await;

    let document: ExportDocument =
        serde_json::from_str(r#"{"version": 1, "date": "2025-04-01T00:00:00.000Z"}"#).unwrap();
    let outcome = store.import_data(&document).await;
    assert!(outcome.success);

    for table in TABLES {
        assert_eq!(count_rows(&store, table).await, 0, "{} should be empty", table);
    }
}

/// Export written by the desktop release: raw column values straight from SQLite
const DESKTOP_EXPORT: &str = r##"{
  "version": 1,
  "date": "2025-02-10T08:30:00.000Z",
  "projects": [
    {"id": 1, "name": "Default Workspace", "color": "#3b82f6", "path": null, "created_at": "2025-01-02 09:00:00"},
    {"id": 3, "name": "site", "color": null, "path": "/work/site", "created_at": "2025-01-05 10:00:00"}
  ],
  "tasks": [
    {"id": 7, "project_id": 3, "title": "Fix header", "description": "", "status": "in-progress",
     "priority": "high", "category": "bug", "estimated_hours": 1.5, "due_date": "",
     "local_path": null, "timer_start": null, "created_at": "2025-01-05 10:05:00"},
    {"id": 9, "project_id": 3, "title": "Launch", "description": null, "status": "todo",
     "priority": "medium", "category": "feature", "estimated_hours": 0,
     "due_date": "2025-03-01T00:00:00.000Z", "local_path": null, "timer_start": null,
     "created_at": "2025-01-06 11:00:00"}
  ],
  "subtasks": [
    {"id": 1, "task_id": 7, "title": "Reproduce", "is_completed": 1, "created_at": null},
    {"id": 2, "task_id": 7, "title": "Patch", "is_completed": 0, "created_at": null},
    {"id": 3, "task_id": 9, "title": "Announce", "is_completed": null, "created_at": null}
  ],
  "tags": [{"id": 4, "name": "css", "color": null}],
  "task_tags": [{"task_id": 7, "tag_id": 4}],
  "time_logs": [
    {"id": 2, "task_id": 7, "start_time": "2025-01-05T10:10:00.000Z",
     "end_time": "2025-01-05T10:40:00.000Z", "duration_seconds": 1800, "created_at": null}
  ]
}"##;

#[tokio::test]
async fn test_import_desktop_export() {
    let (store, _dir) = create_test_store().await;
    populate(&store).await;

    let document: ExportDocument = serde_json::from_str(DESKTOP_EXPORT).unwrap();
    let outcome = store.import_data(&document).await;
    assert!(outcome.success, "{:?}", outcome.error);

    let tasks = store.get_tasks(Some(3)).await.unwrap();
    let header = tasks.iter().find(|t| t.task.id == 7).unwrap();
    assert_eq!(header.task.due_date, None);
    assert_eq!(header.total_subtasks, 2);
    assert_eq!(header.completed_subtasks, 1);
    assert_eq!(header.total_logged, 1800);

    let launch = tasks.iter().find(|t| t.task.id == 9).unwrap();
    assert_eq!(launch.task.due_date.map(|d| d.to_string()).as_deref(), Some("2025-03-01"));
    assert!(!store.get_subtasks(9).await.unwrap()[0].is_completed);

    let projects = store.projects.list().await.unwrap();
    assert_eq!(projects[1].color, devtasks_core::models::DEFAULT_PROJECT_COLOR);

    // Re-exported flags use the same 0/1 encoding
    let again = serde_json::to_value(store.export_data().await.unwrap()).unwrap();
    let flags: Vec<_> = again["subtasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["is_completed"].clone())
        .collect();
    assert_eq!(flags, vec![serde_json::json!(1), serde_json::json!(0), serde_json::json!(0)]);
}

#[tokio::test]
async fn test_export_to_file_and_import_file() {
    let (source, dir) = create_test_store().await;
    populate(&source).await;
    let path = dir.path().join("exports").join("devtasks.json");

    source.transfer.export_to_file(&path).await.unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("partial").exists());

    let (target, _dst_dir) = create_test_store().await;
    let outcome = target.transfer.import_file(&path).await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(counts(&target).await, counts(&source).await);
}

#[tokio::test]
async fn test_import_file_unreadable_leaves_store_alone() {
    let (store, dir) = create_test_store().await;
    populate(&store).await;
    let before = counts(&store).await;

    let missing = store.transfer.import_file(&dir.path().join("missing.json")).await;
    assert!(!missing.success);

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{ not json").unwrap();
    let malformed = store.transfer.import_file(&garbage).await;
    assert!(!malformed.success);

    assert!(DataTransfer::read_document(&garbage).await.is_err());
    assert_eq!(counts(&store).await, before);
}

#[tokio::test]
async fn test_backup_is_openable_copy() {
    let (store, dir) = create_test_store().await;
    populate(&store).await;
    let dest = dir.path().join("backups").join("copy.sqlite");

    let info = store.backup(&dest).await.unwrap();
    assert!(info.bytes > 0);
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), info.bytes);

    // Writes after the backup do not show up in the copy
    add_task(&store, "after backup").await;

    let copy = Store::open(dest).await.unwrap();
    let mut expected = counts(&store).await;
    expected[1] -= 1;
    assert_eq!(counts(&copy).await, expected);
}

#[tokio::test]
async fn test_backup_db_reports_failure() {
    let (store, dir) = create_test_store().await;
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    assert!(!store.backup_db(&blocker.join("copy.sqlite")).await);
    assert!(store.backup_db(&dir.path().join("ok.sqlite")).await);
}

#[tokio::test]
async fn test_backup_refuses_live_file() {
    let (store, _dir) = create_test_store().await;
    let live = store.db.path().to_path_buf();

    assert!(matches!(store.backup(&live).await, Err(Error::Validation(_))));
}
