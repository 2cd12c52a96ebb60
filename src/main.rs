//! marathon-backend server entry point.
//!
//! Connects to PostgreSQL, applies migrations and starts the Axum HTTP
//! server with REST and WebSocket endpoints.

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use marathon_backend::app_state::AppState;
use marathon_backend::build_app;
use marathon_backend::config::MarathonConfig;
use marathon_backend::domain::EventBus;
use marathon_backend::persistence::PostgresStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = MarathonConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting marathon-backend");

    // Connect to the database
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(config.connect_timeout())
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("migrations applied");
    }

    // Build application state
    let event_bus = EventBus::new(config.event_bus_capacity);
    let app_state = AppState::new(PostgresStore::new(pool), event_bus);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, build_app(app_state)).await?;

    Ok(())
}
