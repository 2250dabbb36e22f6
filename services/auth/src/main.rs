use anyhow::Result;
use common::{
    JwtConfig, JwtService,
    config::ServerConfig,
    database::{self, StorageBackend},
    telemetry,
};
use std::sync::Arc;
use tracing::info;

use auth::{
    AppState, Authenticator,
    password::PasswordScheme,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{MemoryUserRepository, PgUserRepository, UserRepository},
    routes,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    telemetry::init();

    info!("Starting authentication service");

    let user_repository: Arc<dyn UserRepository> = match StorageBackend::from_env()? {
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
            Arc::new(PgUserRepository::new(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory user store; accounts are lost on restart");
            Arc::new(MemoryUserRepository::new())
        }
    };

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config)?;

    let authenticator = Authenticator::new(
        user_repository.clone(),
        jwt_service.clone(),
        PasswordScheme::from_env()?,
        RateLimiter::new(RateLimiterConfig::from_env()),
    );

    let app_state = AppState {
        authenticator,
        jwt_service,
        user_repository,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let server = ServerConfig::from_env("AUTH", 3000)?;
    let listener = tokio::net::TcpListener::bind(server.addr()).await?;
    info!("Authentication service listening on {}", server.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Authentication service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
