use anyhow::Result;
use common::{
    JwtConfig, JwtService,
    config::ServerConfig,
    database::{self, StorageBackend},
    telemetry,
};
use tracing::info;

use api::{AppState, repositories::Repositories, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    telemetry::init();

    info!("Starting API service");

    let repositories = match StorageBackend::from_env()? {
        StorageBackend::Postgres => {
            // Initialize database connection pool
            let db_config = database::DatabaseConfig::from_env()?;
            let pool = database::init_pool(&db_config).await?;

            // Check database connectivity
            if database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            database::run_migrations(&pool).await?;
            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Repositories::in_memory()
        }
    };

    // Tokens are verified with the same settings the auth service signs with
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let app_state = AppState::new(repositories, jwt_service);

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let server = ServerConfig::from_env("API", 3001)?;
    let listener = tokio::net::TcpListener::bind(server.addr()).await?;
    info!("API service listening on {}", server.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
