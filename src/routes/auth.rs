//! Registration, login, logout and password change handlers
//!
//! Every mutating outcome becomes a flash notice plus a redirect back
//! to a list-like view; domain errors never escape to a fault page.

use axum::extract::{Extension, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::Deserialize;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::flash::{self, Flash};
use crate::session::CurrentUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Checkbox; present in the form data means "remember me".
    pub remember: Option<String>,
}

#[derive(Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Registration page
pub async fn register_form(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Response> {
    if state.sessions.current_identity(&jar).is_some() {
        return Ok(Redirect::to("/tasks").into_response());
    }
    let (jar, notice) = flash::take(jar);
    let page = state
        .renderer
        .render("register.html", context! { flash => notice })?;
    Ok((jar, page).into_response())
}

/// Handle user registration
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if state.sessions.current_identity(&jar).is_some() {
        return Ok(Redirect::to("/tasks").into_response());
    }

    match state
        .users
        .register(&form.username, &form.password, &form.confirm_password)
        .await
    {
        Ok(_) => {
            let jar = flash::set(jar, Flash::success("Registration successful! Please login."));
            Ok((jar, Redirect::to("/auth/login")).into_response())
        }
        Err(AppError::Validation(e)) => {
            let jar = flash::set(jar, Flash::danger(e.to_string()));
            Ok((jar, Redirect::to("/auth/register")).into_response())
        }
        Err(e) => {
            error!("Registration error: {}", e);
            let jar = flash::set(
                jar,
                Flash::danger("An error occurred during registration. Please try again."),
            );
            Ok((jar, Redirect::to("/auth/register")).into_response())
        }
    }
}

/// Login page
pub async fn login_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
) -> AppResult<Response> {
    if state.sessions.current_identity(&jar).is_some() {
        return Ok(Redirect::to("/tasks").into_response());
    }
    let (jar, notice) = flash::take(jar);
    let page = state.renderer.render(
        "login.html",
        context! { flash => notice, next => query.next },
    )?;
    Ok((jar, page).into_response())
}

/// Handle user login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if state.sessions.current_identity(&jar).is_some() {
        return Ok(Redirect::to("/tasks").into_response());
    }

    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        let jar = flash::set(jar, Flash::danger("Username and password are required"));
        return Ok((jar, Redirect::to("/auth/login")).into_response());
    }

    match state.users.authenticate(username, &form.password).await {
        Ok(user) => {
            let remember = form.remember.is_some();
            let jar = state
                .sessions
                .establish(jar, user.id, &user.username, remember)?;
            let jar = flash::set(
                jar,
                Flash::success(format!("Welcome back, {}!", user.username)),
            );
            let target = safe_next(query.next.as_deref()).unwrap_or("/tasks");
            Ok((jar, Redirect::to(target)).into_response())
        }
        Err(AppError::InvalidCredentials) => {
            let jar = flash::set(jar, Flash::danger("Invalid username or password"));
            Ok((jar, Redirect::to("/auth/login")).into_response())
        }
        Err(e) => {
            error!("Login error: {}", e);
            let jar = flash::set(
                jar,
                Flash::danger("An error occurred during login. Please try again."),
            );
            Ok((jar, Redirect::to("/auth/login")).into_response())
        }
    }
}

/// Handle user logout and clear the session
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Response {
    let jar = state.sessions.clear(jar);
    let jar = flash::set(
        jar,
        Flash::info(format!(
            "Goodbye, {}! You have been logged out.",
            user.username
        )),
    );
    (jar, Redirect::to("/auth/login")).into_response()
}

/// Profile page for the logged-in user
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    let Some(account) = state.users.find(user.id).await? else {
        // The session outlived the account; end it.
        let jar = state.sessions.clear(jar);
        let jar = flash::set(jar, Flash::danger("User not found"));
        return Ok((jar, Redirect::to("/auth/login")).into_response());
    };

    let counts = state.tasks.counts(user.id).await?;
    let (jar, notice) = flash::take(jar);
    let page = state.renderer.render(
        "profile.html",
        context! {
            username => account.username,
            created_at => account.created_at,
            counts => counts,
            flash => notice,
        },
    )?;
    Ok((jar, page).into_response())
}

/// Password change page
pub async fn change_password_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, notice) = flash::take(jar);
    let page = state.renderer.render(
        "change_password.html",
        context! { flash => notice, username => user.username },
    )?;
    Ok((jar, page).into_response())
}

/// Handle a password change for the logged-in user
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<ChangePasswordForm>,
) -> AppResult<Response> {
    match state
        .users
        .change_password(
            user.id,
            &form.current_password,
            &form.new_password,
            &form.confirm_password,
        )
        .await
    {
        Ok(()) => {
            let jar = flash::set(jar, Flash::success("Password changed successfully!"));
            Ok((jar, Redirect::to("/tasks")).into_response())
        }
        Err(AppError::Validation(e)) => {
            let jar = flash::set(jar, Flash::danger(e.to_string()));
            Ok((jar, Redirect::to("/auth/change-password")).into_response())
        }
        Err(e) => {
            error!("Password change error: {}", e);
            let jar = flash::set(
                jar,
                Flash::danger("An error occurred while changing password"),
            );
            Ok((jar, Redirect::to("/auth/change-password")).into_response())
        }
    }
}

/// Only accept same-site paths as post-login targets.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//"))
}
