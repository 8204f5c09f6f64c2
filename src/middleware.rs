//! Login guard middleware
//!
//! Explicit guard composed in front of every authenticated route: it
//! resolves the session identity and injects it into request
//! extensions, or short-circuits to the login page before the guarded
//! handler can run any side effects.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::flash::{self, Flash};
use crate::AppState;

/// Require a valid session; otherwise redirect to the login page with
/// a warning notice, remembering where the user was headed.
pub async fn require_login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match state.sessions.current_identity(&jar) {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => {
            let target = format!("/auth/login?next={}", req.uri().path());
            let jar = flash::set(jar, Flash::warning("Please login to access this page"));
            (jar, Redirect::to(&target)).into_response()
        }
    }
}
