//! Application error taxonomy
//!
//! Domain errors are converted to a flash notice and a redirect at the
//! handler boundary; only unexpected faults fall through to the generic
//! failure response produced by [`AppError::into_response`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::validation::ValidationError;

/// Errors surfaced by the user directory and task store.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed, user-correctable input. Never logged as a fault.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Credential mismatch. One message for unknown username and wrong
    /// password, so the login form does not leak which one failed.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing task and foreign-owned task collapse into one outcome.
    #[error("Task not found or you do not have permission to modify it")]
    NotFoundOrForbidden,

    /// Storage-layer fault; the surrounding transaction has been rolled
    /// back and no detail reaches the user.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failure (broken RNG or parameters).
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Session token signing failure.
    #[error("Session token error: {0}")]
    SessionToken(#[from] jsonwebtoken::errors::Error),

    /// Template rendering failure.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Handlers deal with domain outcomes themselves; anything that
        // reaches this point is an unexpected fault.
        error!("Unhandled application error: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong. Please try again.",
        )
            .into_response()
    }
}

/// Type alias for results carrying an [`AppError`].
pub type AppResult<T> = Result<T, AppError>;
