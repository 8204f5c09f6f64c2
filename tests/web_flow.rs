//! Router-level tests: the login guard and guarded pages.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use sqlx::SqlitePool;
use tower::ServiceExt;

use taskbook::database::{self, DatabaseConfig};
use taskbook::flash::{self, Level};
use taskbook::repositories::{TaskRepository, UserRepository};
use taskbook::routes;
use taskbook::session::{SessionConfig, SessionService};
use taskbook::AppState;

const SESSION_LIFETIME: i64 = 7 * 24 * 60 * 60;

async fn test_app() -> (Router, SqlitePool, SessionService) {
    let config = DatabaseConfig {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
    };
    let pool = database::init_pool(&config).await.unwrap();
    database::create_schema(&pool).await.unwrap();

    let sessions = SessionService::new(&SessionConfig {
        secret: "test-secret".to_string(),
        lifetime_secs: SESSION_LIFETIME,
    });

    let state = AppState::new(pool.clone(), sessions.clone()).unwrap();
    (routes::create_router(state), pool, sessions)
}

/// The session cookie as a request `Cookie` header value.
fn session_header(sessions: &SessionService, user_id: i64, username: &str) -> String {
    let jar = sessions
        .establish(CookieJar::new(), user_id, username, false)
        .unwrap();
    let cookie = jar.iter().next().unwrap();
    format!("{}={}", cookie.name(), cookie.value())
}

/// The flash notice queued on a response, if any.
fn response_flash(res: &axum::response::Response) -> Option<flash::Flash> {
    let mut jar = CookieJar::new();
    for value in res.headers().get_all(header::SET_COOKIE) {
        let cookie = Cookie::parse(value.to_str().unwrap().to_string())
            .unwrap()
            .into_owned();
        jar = jar.add(cookie);
    }
    flash::take(jar).1
}

#[tokio::test]
async fn cookieless_list_request_redirects_to_login_with_a_warning() {
    let (app, _pool, _sessions) = test_app().await;

    let res = app
        .oneshot(Request::builder().uri("/tasks").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "/auth/login?next=/tasks"
    );

    let notice = response_flash(&res).unwrap();
    assert_eq!(notice.level, Level::Warning);
    assert_eq!(notice.message, "Please login to access this page");
}

#[tokio::test]
async fn cookieless_mutation_never_reaches_the_store() {
    let (app, pool, _sessions) = test_app().await;

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tasks/add")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title=Sneaky&description="))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "/auth/login?next=/tasks/add"
    );

    // The guard short-circuited: no row was written.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn a_valid_session_passes_the_guard() {
    let (app, pool, sessions) = test_app().await;
    let users = UserRepository::new(pool.clone());
    let alice = users
        .register("alice", "password123", "password123")
        .await
        .unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header(header::COOKIE, session_header(&sessions, alice, "alice"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.contains("alice's tasks"));
}

#[tokio::test]
async fn a_tampered_session_is_turned_away() {
    let (app, _pool, sessions) = test_app().await;

    let mut header_value = session_header(&sessions, 1, "alice");
    header_value.push('x');

    let res = app
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header(header::COOKIE, header_value)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "/auth/login?next=/tasks"
    );
}

#[tokio::test]
async fn profile_shows_account_details_and_counts() {
    let (app, pool, sessions) = test_app().await;
    let users = UserRepository::new(pool.clone());
    let tasks = TaskRepository::new(pool.clone());

    let alice = users
        .register("alice", "password123", "password123")
        .await
        .unwrap();
    let id = tasks.create(alice, "Write report", "").await.unwrap();
    tasks.toggle_status(alice, id).await.unwrap();
    tasks.toggle_status(alice, id).await.unwrap();
    tasks.create(alice, "File taxes", "").await.unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/auth/profile")
                .header(header::COOKIE, session_header(&sessions, alice, "alice"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.contains("alice"));
    assert!(page.contains("Member since"));
    assert!(page.contains("Total tasks: 2"));
    assert!(page.contains("Done: 1"));
}
