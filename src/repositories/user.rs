//! User directory: registration, authentication and account lifecycle

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::password;
use crate::validation::{self, ValidationError};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new user and return its id.
    ///
    /// Performs a check-then-insert for the friendly error path; the
    /// UNIQUE constraint on username remains the authoritative guard,
    /// so a racing duplicate insert still surfaces as `UsernameTaken`.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> AppResult<i64> {
        let username = username.trim();
        validation::validate_registration(username, password, confirm)?;

        if self.find_by_username(username).await?.is_some() {
            return Err(ValidationError::UsernameTaken.into());
        }

        let password_hash = password::hash_password(password)?;
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        let user_id = result.last_insert_rowid();
        info!("Registered user {} (id {})", username, user_id);
        Ok(user_id)
    }

    /// Authenticate a user by username and password.
    ///
    /// Unknown username and wrong password both yield
    /// `InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let username = username.trim();
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        info!("Authenticated user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Find a user by id
    pub async fn find(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    /// Find a user by exact, case-sensitive username
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    /// Replace the stored password hash after checking the current
    /// password and validating the new one.
    pub async fn change_password(
        &self,
        user_id: i64,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> AppResult<()> {
        let user = self
            .find(user_id)
            .await?
            .ok_or(AppError::NotFoundOrForbidden)?;

        if !password::verify_password(current, &user.password_hash) {
            return Err(ValidationError::CurrentPasswordIncorrect.into());
        }
        validation::validate_new_password(new, confirm)?;

        let password_hash = password::hash_password(new)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!("Password changed for user id {}", user_id);
        Ok(())
    }

    /// Delete a user. All owned tasks go with it via the cascading
    /// foreign key. Admin-style operation, not exposed over a route.
    pub async fn delete(&self, user_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!("Deleted user id {} (tasks cascaded)", user_id);
        Ok(())
    }
}

fn row_to_user(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

/// Map a UNIQUE constraint violation on username to `UsernameTaken`;
/// this is the authoritative answer for registration races.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            ValidationError::UsernameTaken.into()
        }
        other => other.into(),
    }
}
