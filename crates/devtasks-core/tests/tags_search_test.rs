mod common;

use common::{add_task, count_rows, create_test_store, DEFAULT_PROJECT};
use devtasks_core::models::DEFAULT_TAG_COLOR;
use devtasks_core::{Error, HitKind};

#[tokio::test]
async fn test_create_tag_twice_returns_same_row() {
    let (store, _dir) = create_test_store().await;

    let first = store.create_tag("backend").await.unwrap();
    let second = store.create_tag("  backend ").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.color.as_deref(), Some(DEFAULT_TAG_COLOR));
    assert_eq!(count_rows(&store, "tags").await, 1);
}

#[tokio::test]
async fn test_tag_names_are_case_sensitive() {
    let (store, _dir) = create_test_store().await;

    let lower = store.create_tag("ui").await.unwrap();
    let upper = store.create_tag("UI").await.unwrap();
    assert_ne!(lower.id, upper.id);
}

#[tokio::test]
async fn test_blank_tag_rejected() {
    let (store, _dir) = create_test_store().await;

    assert!(matches!(store.create_tag("   ").await, Err(Error::Validation(_))));
    assert_eq!(count_rows(&store, "tags").await, 0);
}

#[tokio::test]
async fn test_link_is_idempotent_and_unlink_removes() {
    let (store, _dir) = create_test_store().await;
    let task = add_task(&store, "Tag me").await.task;
    let tag = store.create_tag("infra").await.unwrap();

    assert!(store.link_tag(task.id, tag.id).await.unwrap());
    assert!(!store.link_tag(task.id, tag.id).await.unwrap());
    assert_eq!(count_rows(&store, "task_tags").await, 1);

    let tags = store.get_task_tags(task.id).await.unwrap();
    assert_eq!(tags, vec![tag.clone()]);

    assert!(store.unlink_tag(task.id, tag.id).await.unwrap());
    assert!(!store.unlink_tag(task.id, tag.id).await.unwrap());
    assert!(store.get_task_tags(task.id).await.unwrap().is_empty());
    // The tag outlives its links
    assert_eq!(store.get_tags().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_link_to_missing_task_fails() {
    let (store, _dir) = create_test_store().await;
    let tag = store.create_tag("orphan").await.unwrap();

    assert!(store.link_tag(999, tag.id).await.is_err());
    assert_eq!(count_rows(&store, "task_tags").await, 0);
}

#[tokio::test]
async fn test_tags_listed_alphabetically() {
    let (store, _dir) = create_test_store().await;
    for name in ["zeta", "alpha", "mid"] {
        store.create_tag(name).await.unwrap();
    }

    let names: Vec<String> = store.get_tags().await.unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);

    assert!(store.tags.find_by_name(" mid ").await.unwrap().is_some());
    assert!(store.tags.find_by_name("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_tasks_before_subtasks() {
    let (store, _dir) = create_test_store().await;
    let login = add_task(&store, "Fix Login flow").await.task;
    add_task(&store, "Write docs").await;
    let sub = store.add_subtask(login.id, "check login redirect").await.unwrap();

    let hits = store.search_all(Some(DEFAULT_PROJECT), "LOGIN").await.unwrap();
    assert_eq!(hits.len(), 2);

    assert_eq!(hits[0].kind, HitKind::Task);
    assert_eq!(hits[0].id, login.id);
    assert_eq!(hits[0].task_id, login.id);
    assert_eq!(hits[0].parent_title, None);

    assert_eq!(hits[1].kind, HitKind::Subtask);
    assert_eq!(hits[1].id, sub.id);
    assert_eq!(hits[1].task_id, login.id);
    assert_eq!(hits[1].parent_title.as_deref(), Some("Fix Login flow"));
}

#[tokio::test]
async fn test_search_short_term_or_no_project_is_empty() {
    let (store, _dir) = create_test_store().await;
    add_task(&store, "a task").await;

    assert!(store.search_all(Some(DEFAULT_PROJECT), "a").await.unwrap().is_empty());
    assert!(store.search_all(Some(DEFAULT_PROJECT), "  t  ").await.unwrap().is_empty());
    assert!(store.search_all(None, "task").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_is_scoped_to_project() {
    let (store, _dir) = create_test_store().await;
    add_task(&store, "shared words").await;
    let other = store.open_project("/work/other").await.unwrap();

    assert!(store.search_all(Some(other.id), "shared").await.unwrap().is_empty());
    assert_eq!(
        store.search_all(Some(DEFAULT_PROJECT), "shared").await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let (store, _dir) = create_test_store().await;
    add_task(&store, "Reach 100% coverage").await;
    add_task(&store, "Reach 1000 users").await;
    add_task(&store, "rename snake_case fields").await;
    add_task(&store, "rename snakeXcase fields").await;

    let hits = store.search_all(Some(DEFAULT_PROJECT), "0%").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Reach 100% coverage");

    let hits = store.search_all(Some(DEFAULT_PROJECT), "e_c").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "rename snake_case fields");
}

#[tokio::test]
async fn test_search_caps_results() {
    let (store, _dir) = create_test_store().await;
    for i in 0..15 {
        add_task(&store, &format!("report {}", i)).await;
    }

    let hits = store.search_all(Some(DEFAULT_PROJECT), "report").await.unwrap();
    assert_eq!(hits.len(), 10);
}

#[tokio::test]
async fn test_search_folds_non_ascii_case() {
    let (store, _dir) = create_test_store().await;
    let task = add_task(&store, "Ärger mit dem Build").await.task;
    add_task(&store, "Arger ohne Umlaut").await;
    store.add_subtask(task.id, "ÜBERSICHT erstellen").await.unwrap();
    for i in 0..12 {
        add_task(&store, &format!("Straße {}", i)).await;
    }

    let hits = store.search_all(Some(DEFAULT_PROJECT), "ärger").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, task.id);

    let hits = store.search_all(Some(DEFAULT_PROJECT), "übersicht").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, HitKind::Subtask);

    let hits = store.search_all(Some(DEFAULT_PROJECT), "STRAßE").await.unwrap();
    assert_eq!(hits.len(), 10);
}
