//! Task store: ownership-scoped CRUD and the status cycle
//!
//! Every query filters on the owning user id. A task that does not
//! exist and a task owned by someone else are indistinguishable to the
//! caller: both are `NotFoundOrForbidden`.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Task, TaskCounts, TaskStatus};
use crate::validation;

/// Task repository
#[derive(Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    /// Create a new task repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's tasks, newest first, optionally restricted to
    /// one status.
    pub async fn list(&self, owner_id: i64, status: Option<TaskStatus>) -> AppResult<Vec<Task>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT id, title, description, status, created_at, updated_at, user_id
                    FROM tasks
                    WHERE user_id = ? AND status = ?
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(owner_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, title, description, status, created_at, updated_at, user_id
                    FROM tasks
                    WHERE user_id = ?
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(row_to_task).collect()
    }

    /// Fetch a single task owned by `owner_id`.
    pub async fn find(&self, owner_id: i64, task_id: i64) -> AppResult<Task> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, status, created_at, updated_at, user_id
            FROM tasks
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_task(row),
            None => Err(AppError::NotFoundOrForbidden),
        }
    }

    /// Create a task for the owner and return its id. Title and
    /// description are trimmed; an empty description is stored as NULL.
    pub async fn create(
        &self,
        owner_id: i64,
        title: &str,
        description: &str,
    ) -> AppResult<i64> {
        let title = title.trim();
        validation::validate_title(title)?;
        let description = normalize_description(description);
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, status, created_at, updated_at, user_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(&description)
        .bind(TaskStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        let task_id = result.last_insert_rowid();
        info!("Created task {} for user {}", task_id, owner_id);
        Ok(task_id)
    }

    /// Update title and description of an owned task and refresh
    /// `updated_at`.
    pub async fn update(
        &self,
        owner_id: i64,
        task_id: i64,
        title: &str,
        description: &str,
    ) -> AppResult<()> {
        let title = title.trim();
        validation::validate_title(title)?;
        let description = normalize_description(description);

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(title)
        .bind(&description)
        .bind(Utc::now())
        .bind(task_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFoundOrForbidden);
        }

        info!("Updated task {} for user {}", task_id, owner_id);
        Ok(())
    }

    /// Advance an owned task one step along the status cycle and
    /// return its title and new status for messaging.
    ///
    /// Read and write happen in one transaction so a racing delete
    /// rolls this back cleanly instead of resurrecting the row.
    pub async fn toggle_status(
        &self,
        owner_id: i64,
        task_id: i64,
    ) -> AppResult<(String, TaskStatus)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT title, status
            FROM tasks
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(AppError::NotFoundOrForbidden);
        };

        let title: String = row.get("title");
        let status = decode_status(row.get("status"))?;
        let new_status = status.toggled();

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(new_status.as_str())
        .bind(Utc::now())
        .bind(task_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFoundOrForbidden);
        }

        tx.commit().await?;
        info!(
            "Toggled task {} for user {}: {} -> {}",
            task_id, owner_id, status, new_status
        );
        Ok((title, new_status))
    }

    /// Delete an owned task and return its title for messaging.
    pub async fn delete(&self, owner_id: i64, task_id: i64) -> AppResult<String> {
        let row = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = ? AND user_id = ?
            RETURNING title
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AppError::NotFoundOrForbidden);
        };

        info!("Deleted task {} for user {}", task_id, owner_id);
        Ok(row.get("title"))
    }

    /// Delete every task the owner has; returns the number removed.
    /// Zero is a valid outcome, not an error.
    pub async fn clear_all(&self, owner_id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = ?")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        let count = result.rows_affected();
        info!("Cleared {} task(s) for user {}", count, owner_id);
        Ok(count)
    }

    /// Delete the owner's Done tasks only; returns the number removed.
    pub async fn clear_completed(&self, owner_id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = ? AND status = ?")
            .bind(owner_id)
            .bind(TaskStatus::Done.as_str())
            .execute(&self.pool)
            .await?;

        let count = result.rows_affected();
        info!("Cleared {} completed task(s) for user {}", count, owner_id);
        Ok(count)
    }

    /// Per-status statistics, recomputed from the current rows.
    pub async fn counts(&self, owner_id: i64) -> AppResult<TaskCounts> {
        let rows = sqlx::query("SELECT status FROM tasks WHERE user_id = ?")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        let mut counts = TaskCounts::default();
        for row in rows {
            counts.total += 1;
            match decode_status(row.get("status"))? {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Working => counts.working += 1,
                TaskStatus::Done => counts.done += 1,
            }
        }
        Ok(counts)
    }
}

fn normalize_description(description: &str) -> Option<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn decode_status(value: String) -> AppResult<TaskStatus> {
    TaskStatus::parse(&value).ok_or_else(|| {
        AppError::Database(sqlx::Error::Decode(
            format!("invalid task status {value:?}").into(),
        ))
    })
}

fn row_to_task(row: SqliteRow) -> AppResult<Task> {
    Ok(Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: decode_status(row.get("status"))?,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        user_id: row.get("user_id"),
    })
}
