//! Input validation for registration, password changes and task forms
//!
//! The `#[error]` strings double as the user-facing flash messages, so
//! handlers can surface a variant directly.

use thiserror::Error;

/// Username length bounds.
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Maximum task title length.
pub const TITLE_MAX_LEN: usize = 200;

/// User-correctable input failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username is required")]
    EmptyUsername,

    #[error("Password is required")]
    EmptyPassword,

    #[error("Username must be at least 3 characters long")]
    UsernameTooShort,

    #[error("Username must be less than 50 characters")]
    UsernameTooLong,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username already exists. Please choose a different one.")]
    UsernameTaken,

    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,

    #[error("Task title is required")]
    EmptyTitle,

    #[error("Task title must be less than 200 characters")]
    TitleTooLong,
}

/// Validate a registration form.
///
/// The username is expected to be trimmed already. Confirmation is
/// required: an empty or differing confirm field is a mismatch.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if username.chars().count() < USERNAME_MIN_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(ValidationError::UsernameTooLong);
    }
    validate_new_password(password, confirm)
}

/// Validate a new password and its confirmation.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Validate a task title (expected to be trimmed already).
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}
