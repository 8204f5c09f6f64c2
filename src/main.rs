use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskbook::session::{SessionConfig, SessionService};
use taskbook::{database, routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting taskbook");

    // Initialize database connection pool and schema
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;
    database::create_schema(&pool).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize session service
    let session_config = SessionConfig::from_env()?;
    let sessions = SessionService::new(&session_config);

    let app_state = AppState::new(pool, sessions)?;

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Taskbook listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
