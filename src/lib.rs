//! Taskbook: a session-authenticated, multi-user task tracker.
//!
//! Users register, log in, and manage personal todo items with a
//! three-state lifecycle (Pending -> Working -> Done -> Pending). Every
//! task operation is scoped to the owning user; sessions are carried in
//! a signed cookie and mutations answer with a redirect plus a
//! single-use flash notice.

pub mod database;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod password;
pub mod render;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod validation;

use sqlx::SqlitePool;

use crate::render::Renderer;
use crate::repositories::{TaskRepository, UserRepository};
use crate::session::SessionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub sessions: SessionService,
    pub users: UserRepository,
    pub tasks: TaskRepository,
    pub renderer: Renderer,
}

impl AppState {
    /// Assemble the application state around an initialized pool.
    pub fn new(pool: SqlitePool, sessions: SessionService) -> anyhow::Result<Self> {
        Ok(Self {
            users: UserRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool.clone()),
            renderer: Renderer::new()?,
            db_pool: pool,
            sessions,
        })
    }
}
