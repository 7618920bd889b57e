//! Shared helpers for store integration tests

#![allow(dead_code)]

use devtasks_core::{NewTask, Store, TaskWithStats};
use tempfile::TempDir;

/// Id of the project seeded on first run
pub const DEFAULT_PROJECT: i64 = 1;

/// Helper to create a test store backed by a temp file
pub async fn create_test_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");
    let store = Store::open(db_path).await.expect("Failed to create test store");
    (store, temp_dir)
}

/// Insert a task with defaults into the seeded project
pub async fn add_task(store: &Store, title: &str) -> TaskWithStats {
    store
        .add_task(NewTask::new(DEFAULT_PROJECT, title))
        .await
        .expect("Failed to add task")
}

pub async fn count_rows(store: &Store, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&store.db.pool)
        .await
        .expect("Count query should succeed");
    count
}
