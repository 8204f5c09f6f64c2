//! Task list, CRUD and bulk-clear handlers
//!
//! The login guard has already resolved the session, so every handler
//! here receives the owner as a request extension and passes the owner
//! id down to the store; ownership is enforced there, not here.

use axum::extract::{Extension, Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::Deserialize;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::flash::{self, Flash};
use crate::models::{StatusFilter, TaskStatus};
use crate::session::CurrentUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct TaskForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Display the current user's tasks, optionally filtered by status.
pub async fn view_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let filter = match query.status.as_deref() {
        None => StatusFilter::All,
        Some(raw) => match StatusFilter::parse(raw) {
            Some(filter) => filter,
            None => {
                // Unrecognized filter: warn and fall back to the
                // unfiltered list.
                let jar = flash::set(jar, Flash::warning("Invalid filter option"));
                return Ok((jar, Redirect::to("/tasks")).into_response());
            }
        },
    };

    let tasks = state.tasks.list(user.id, filter.status()).await?;
    let counts = state.tasks.counts(user.id).await?;
    let current_filter = filter.status().map_or("All", TaskStatus::as_str);

    let (jar, notice) = flash::take(jar);
    let page = state.renderer.render(
        "tasks.html",
        context! {
            username => user.username,
            tasks => tasks,
            counts => counts,
            current_filter => current_filter,
            flash => notice,
        },
    )?;
    Ok((jar, page).into_response())
}

/// Add a new task for the current user.
pub async fn add_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<TaskForm>,
) -> AppResult<Response> {
    let jar = match state
        .tasks
        .create(user.id, &form.title, &form.description)
        .await
    {
        Ok(_) => flash::set(jar, Flash::success("Task added successfully!")),
        Err(AppError::Validation(e)) => flash::set(jar, Flash::danger(e.to_string())),
        Err(e) => {
            error!("Add task error: {}", e);
            flash::set(jar, Flash::danger("Error adding task. Please try again."))
        }
    };
    Ok((jar, Redirect::to("/tasks")).into_response())
}

/// Edit form for a single owned task.
pub async fn edit_task_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(task_id): Path<i64>,
) -> AppResult<Response> {
    match state.tasks.find(user.id, task_id).await {
        Ok(task) => {
            let (jar, notice) = flash::take(jar);
            let page = state.renderer.render(
                "edit_task.html",
                context! { username => user.username, task => task, flash => notice },
            )?;
            Ok((jar, page).into_response())
        }
        Err(AppError::NotFoundOrForbidden) => {
            let jar = flash::set(
                jar,
                Flash::danger("Task not found or you do not have permission to edit it"),
            );
            Ok((jar, Redirect::to("/tasks")).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Update an owned task.
pub async fn edit_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(task_id): Path<i64>,
    Form(form): Form<TaskForm>,
) -> AppResult<Response> {
    match state
        .tasks
        .update(user.id, task_id, &form.title, &form.description)
        .await
    {
        Ok(()) => {
            let jar = flash::set(jar, Flash::success("Task updated successfully!"));
            Ok((jar, Redirect::to("/tasks")).into_response())
        }
        Err(AppError::Validation(e)) => {
            let jar = flash::set(jar, Flash::danger(e.to_string()));
            Ok((
                jar,
                Redirect::to(&format!("/tasks/{task_id}/edit")),
            )
                .into_response())
        }
        Err(AppError::NotFoundOrForbidden) => {
            let jar = flash::set(
                jar,
                Flash::danger("Task not found or you do not have permission to edit it"),
            );
            Ok((jar, Redirect::to("/tasks")).into_response())
        }
        Err(e) => {
            error!("Edit task error: {}", e);
            let jar = flash::set(jar, Flash::danger("Error updating task. Please try again."));
            Ok((
                jar,
                Redirect::to(&format!("/tasks/{task_id}/edit")),
            )
                .into_response())
        }
    }
}

/// Cycle an owned task's status one step.
pub async fn toggle_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(task_id): Path<i64>,
) -> AppResult<Response> {
    let jar = match state.tasks.toggle_status(user.id, task_id).await {
        Ok((title, TaskStatus::Working)) => flash::set(
            jar,
            Flash::info(format!("Task \"{title}\" is now in progress")),
        ),
        Ok((title, TaskStatus::Done)) => {
            flash::set(jar, Flash::success(format!("Task \"{title}\" completed!")))
        }
        Ok((title, TaskStatus::Pending)) => {
            flash::set(jar, Flash::info(format!("Task \"{title}\" reopened")))
        }
        Err(AppError::NotFoundOrForbidden) => flash::set(
            jar,
            Flash::danger("Task not found or you do not have permission to modify it"),
        ),
        Err(e) => {
            error!("Toggle status error: {}", e);
            flash::set(jar, Flash::danger("Error updating task status"))
        }
    };
    Ok((jar, Redirect::to("/tasks")).into_response())
}

/// Delete an owned task.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(task_id): Path<i64>,
) -> AppResult<Response> {
    let jar = match state.tasks.delete(user.id, task_id).await {
        Ok(title) => flash::set(
            jar,
            Flash::success(format!("Task \"{title}\" deleted successfully")),
        ),
        Err(AppError::NotFoundOrForbidden) => flash::set(
            jar,
            Flash::danger("Task not found or you do not have permission to delete it"),
        ),
        Err(e) => {
            error!("Delete task error: {}", e);
            flash::set(jar, Flash::danger("Error deleting task. Please try again."))
        }
    };
    Ok((jar, Redirect::to("/tasks")).into_response())
}

/// Delete all of the current user's tasks.
pub async fn clear_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    let jar = match state.tasks.clear_all(user.id).await {
        Ok(0) => flash::set(jar, Flash::info("No tasks to clear")),
        Ok(count) => flash::set(
            jar,
            Flash::success(format!("{count} task(s) cleared successfully!")),
        ),
        Err(e) => {
            error!("Clear tasks error: {}", e);
            flash::set(jar, Flash::danger("Error clearing tasks. Please try again."))
        }
    };
    Ok((jar, Redirect::to("/tasks")).into_response())
}

/// Delete the current user's completed tasks.
pub async fn clear_completed(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    let jar = match state.tasks.clear_completed(user.id).await {
        Ok(0) => flash::set(jar, Flash::info("No completed tasks to clear")),
        Ok(count) => flash::set(
            jar,
            Flash::success(format!("{count} completed task(s) cleared!")),
        ),
        Err(e) => {
            error!("Clear completed tasks error: {}", e);
            flash::set(
                jar,
                Flash::danger("Error clearing completed tasks. Please try again."),
            )
        }
    };
    Ok((jar, Redirect::to("/tasks")).into_response())
}
