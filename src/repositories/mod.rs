//! Repositories for database operations

pub mod task;
pub mod user;

pub use task::TaskRepository;
pub use user::UserRepository;
