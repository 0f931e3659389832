//! Evently
//!
//! Main application entry point

use std::sync::Arc;
use tracing::info;

use evently::{
    config::Settings,
    database::{connection, DatabaseService},
    handlers::{create_router, AppState},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard must outlive the server
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", evently::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..connection::DatabaseConfig::default()
    };
    let pool = connection::create_pool(&db_config).await?;

    // Run database migrations
    connection::run_migrations(&pool).await?;

    // Initialize services
    info!("Initializing services...");
    let database_service = DatabaseService::new(pool.clone());
    let services = ServiceFactory::new(database_service, settings.clone());

    // Bootstrap the super admin on an empty users table
    services.auth_service.bootstrap_super_admin().await?;

    let state = Arc::new(AppState {
        services,
        settings: settings.clone(),
        pool,
    });

    let router = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
