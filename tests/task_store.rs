//! Task store integration tests over an in-memory database.

use std::time::Duration;

use sqlx::SqlitePool;
use taskbook::database::{self, DatabaseConfig};
use taskbook::error::AppError;
use taskbook::models::TaskStatus;
use taskbook::repositories::{TaskRepository, UserRepository};
use taskbook::validation::ValidationError;

async fn test_pool() -> SqlitePool {
    let config = DatabaseConfig {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
    };
    let pool = database::init_pool(&config).await.unwrap();
    database::create_schema(&pool).await.unwrap();
    pool
}

async fn fixture() -> (TaskRepository, i64) {
    let pool = test_pool().await;
    let users = UserRepository::new(pool.clone());
    let owner = users
        .register("alice", "password123", "password123")
        .await
        .unwrap();
    (TaskRepository::new(pool), owner)
}

#[tokio::test]
async fn created_tasks_start_pending_and_list_newest_first() {
    let (tasks, owner) = fixture().await;

    tasks.create(owner, "first", "").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    tasks.create(owner, "second", "").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    tasks.create(owner, "third", "").await.unwrap();

    let listed = tasks.list(owner, None).await.unwrap();
    let titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["third", "second", "first"]);
    assert!(listed.iter().all(|t| t.status == TaskStatus::Pending));
}

#[tokio::test]
async fn title_boundary_at_200_characters() {
    let (tasks, owner) = fixture().await;

    let at_max = "x".repeat(200);
    tasks.create(owner, &at_max, "").await.unwrap();

    let over = "x".repeat(201);
    let err = tasks.create(owner, &over, "").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::TitleTooLong)
    ));

    let err = tasks.create(owner, "   ", "").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::EmptyTitle)
    ));
}

#[tokio::test]
async fn blank_description_is_stored_as_absent() {
    let (tasks, owner) = fixture().await;

    let id = tasks.create(owner, "Buy milk", "   ").await.unwrap();
    assert_eq!(tasks.find(owner, id).await.unwrap().description, None);

    let id = tasks.create(owner, "Buy bread", "  rye, sliced  ").await.unwrap();
    assert_eq!(
        tasks.find(owner, id).await.unwrap().description.as_deref(),
        Some("rye, sliced")
    );
}

#[tokio::test]
async fn edit_round_trip_refreshes_updated_at() {
    let (tasks, owner) = fixture().await;

    let id = tasks.create(owner, "Buy milk", "").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    tasks
        .update(owner, id, "Buy milk and bread", "while the shop is open")
        .await
        .unwrap();

    let task = tasks.find(owner, id).await.unwrap();
    assert_eq!(task.title, "Buy milk and bread");
    assert_eq!(task.description.as_deref(), Some("while the shop is open"));
    assert!(task.updated_at > task.created_at);
}

#[tokio::test]
async fn toggle_walks_the_cycle_and_returns_the_new_status() {
    let (tasks, owner) = fixture().await;
    let id = tasks.create(owner, "Write spec", "").await.unwrap();

    let (title, status) = tasks.toggle_status(owner, id).await.unwrap();
    assert_eq!(title, "Write spec");
    assert_eq!(status, TaskStatus::Working);

    let (_, status) = tasks.toggle_status(owner, id).await.unwrap();
    assert_eq!(status, TaskStatus::Done);

    let (_, status) = tasks.toggle_status(owner, id).await.unwrap();
    assert_eq!(status, TaskStatus::Pending);

    // Three toggles later the task is back where it started.
    assert_eq!(tasks.find(owner, id).await.unwrap().status, TaskStatus::Pending);
}

#[tokio::test]
async fn tasks_are_invisible_to_other_users() {
    let pool = test_pool().await;
    let users = UserRepository::new(pool.clone());
    let tasks = TaskRepository::new(pool);

    let alice = users
        .register("alice", "password123", "password123")
        .await
        .unwrap();
    let bob = users
        .register("bob", "password123", "password123")
        .await
        .unwrap();

    let id = tasks.create(alice, "Secret plan", "").await.unwrap();

    assert!(matches!(
        tasks.find(bob, id).await.unwrap_err(),
        AppError::NotFoundOrForbidden
    ));
    assert!(matches!(
        tasks.update(bob, id, "Hijacked", "").await.unwrap_err(),
        AppError::NotFoundOrForbidden
    ));
    assert!(matches!(
        tasks.toggle_status(bob, id).await.unwrap_err(),
        AppError::NotFoundOrForbidden
    ));
    assert!(matches!(
        tasks.delete(bob, id).await.unwrap_err(),
        AppError::NotFoundOrForbidden
    ));
    assert!(tasks.list(bob, None).await.unwrap().is_empty());
    assert_eq!(tasks.clear_all(bob).await.unwrap(), 0);

    // Alice's task survived every attempt.
    let task = tasks.find(alice, id).await.unwrap();
    assert_eq!(task.title, "Secret plan");
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn clear_completed_removes_exactly_the_done_tasks() {
    let (tasks, owner) = fixture().await;

    let done_a = tasks.create(owner, "done a", "").await.unwrap();
    let done_b = tasks.create(owner, "done b", "").await.unwrap();
    let working = tasks.create(owner, "working", "").await.unwrap();
    tasks.create(owner, "pending", "").await.unwrap();

    // done = two toggles, working = one.
    for id in [done_a, done_b] {
        tasks.toggle_status(owner, id).await.unwrap();
        tasks.toggle_status(owner, id).await.unwrap();
    }
    tasks.toggle_status(owner, working).await.unwrap();

    assert_eq!(tasks.clear_completed(owner).await.unwrap(), 2);

    let counts = tasks.counts(owner).await.unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.working, 1);
    assert_eq!(counts.done, 0);

    assert_eq!(tasks.clear_completed(owner).await.unwrap(), 0);
}

#[tokio::test]
async fn list_filters_by_status() {
    let (tasks, owner) = fixture().await;

    tasks.create(owner, "stay pending", "").await.unwrap();
    let id = tasks.create(owner, "go working", "").await.unwrap();
    tasks.toggle_status(owner, id).await.unwrap();

    let working = tasks.list(owner, Some(TaskStatus::Working)).await.unwrap();
    assert_eq!(working.len(), 1);
    assert_eq!(working[0].title, "go working");

    let done = tasks.list(owner, Some(TaskStatus::Done)).await.unwrap();
    assert!(done.is_empty());

    assert_eq!(tasks.list(owner, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn mutating_a_deleted_task_reports_not_found() {
    let (tasks, owner) = fixture().await;
    let id = tasks.create(owner, "ephemeral", "").await.unwrap();

    let title = tasks.delete(owner, id).await.unwrap();
    assert_eq!(title, "ephemeral");

    assert!(matches!(
        tasks.update(owner, id, "too late", "").await.unwrap_err(),
        AppError::NotFoundOrForbidden
    ));
    assert!(matches!(
        tasks.toggle_status(owner, id).await.unwrap_err(),
        AppError::NotFoundOrForbidden
    ));
    assert!(matches!(
        tasks.delete(owner, id).await.unwrap_err(),
        AppError::NotFoundOrForbidden
    ));
}

#[tokio::test]
async fn full_user_scenario() {
    let pool = test_pool().await;
    let users = UserRepository::new(pool.clone());
    let tasks = TaskRepository::new(pool);

    users
        .register("john", "password123", "password123")
        .await
        .unwrap();
    let john = users.authenticate("john", "password123").await.unwrap();

    tasks.create(john.id, "Write spec", "").await.unwrap();

    let listed = tasks.list(john.id, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, TaskStatus::Pending);

    let (_, status) = tasks.toggle_status(john.id, listed[0].id).await.unwrap();
    assert_eq!(status, TaskStatus::Working);
    let (_, status) = tasks.toggle_status(john.id, listed[0].id).await.unwrap();
    assert_eq!(status, TaskStatus::Done);

    assert_eq!(tasks.clear_completed(john.id).await.unwrap(), 1);
    assert!(tasks.list(john.id, None).await.unwrap().is_empty());
    let counts = tasks.counts(john.id).await.unwrap();
    assert_eq!(counts.total, 0);
    assert_eq!(counts.pending, 0);
    assert_eq!(counts.working, 0);
    assert_eq!(counts.done, 0);
}

#[tokio::test]
async fn clear_all_reports_the_number_removed() {
    let (tasks, owner) = fixture().await;

    assert_eq!(tasks.clear_all(owner).await.unwrap(), 0);

    for title in ["a", "b", "c"] {
        tasks.create(owner, title, "").await.unwrap();
    }
    assert_eq!(tasks.clear_all(owner).await.unwrap(), 3);
    assert!(tasks.list(owner, None).await.unwrap().is_empty());
}
