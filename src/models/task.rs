//! Task model and status lifecycle

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Task status lifecycle. Tasks start Pending and only ever move along
/// the single cycle Pending -> Working -> Done -> Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    Pending,
    Working,
    Done,
}

impl TaskStatus {
    /// The next status along the cycle.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Working,
            TaskStatus::Working => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Pending,
        }
    }

    /// Stored representation; matches the CHECK constraint on the
    /// tasks table.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Working => "Working",
            TaskStatus::Done => "Done",
        }
    }

    /// Parse a stored or submitted status value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(TaskStatus::Pending),
            "Working" => Some(TaskStatus::Working),
            "Done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status filter as submitted by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    /// Parse a submitted filter value; `None` means the value was not
    /// recognized and the caller should fall back to the unfiltered
    /// view with a warning.
    pub fn parse(value: &str) -> Option<Self> {
        if value == "All" {
            return Some(StatusFilter::All);
        }
        TaskStatus::parse(value).map(StatusFilter::Only)
    }

    /// The status to restrict to, if any.
    pub fn status(self) -> Option<TaskStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(status),
        }
    }
}

/// Task entity
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
}

/// Per-user task statistics, recomputed from current rows on every
/// list render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: u64,
    pub pending: u64,
    pub working: u64,
    pub done: u64,
}
