//! User model

use chrono::{DateTime, Utc};
use serde::Serialize;

/// User entity
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// PHC-format hash; the plaintext is never stored.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
