//! Data models

pub mod task;
pub mod user;

pub use task::{StatusFilter, Task, TaskCounts, TaskStatus};
pub use user::User;
