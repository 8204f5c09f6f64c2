//! Route table and top-level handlers

pub mod auth;
pub mod tasks;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use axum_extra::extract::cookie::CookieJar;

use crate::middleware::require_login;
use crate::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/tasks", get(tasks::view_tasks))
        .route("/tasks/add", post(tasks::add_task))
        .route(
            "/tasks/:id/edit",
            get(tasks::edit_task_form).post(tasks::edit_task),
        )
        .route("/tasks/:id/toggle", post(tasks::toggle_status))
        .route("/tasks/:id/delete", post(tasks::delete_task))
        .route("/tasks/clear", post(tasks::clear_tasks))
        .route("/tasks/clear-completed", post(tasks::clear_completed))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile))
        .route(
            "/auth/change-password",
            get(auth::change_password_form).post(auth::change_password),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_login,
        ));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route(
            "/auth/register",
            get(auth::register_form).post(auth::register),
        )
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .merge(guarded)
        .with_state(state)
}

/// Root route: logged-in users land on their task list, everyone else
/// on the login page.
async fn index(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if state.sessions.current_identity(&jar).is_some() {
        Redirect::to("/tasks")
    } else {
        Redirect::to("/auth/login")
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "taskbook"
    }))
}
