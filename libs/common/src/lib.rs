//! Common library for the Repairdesk services
//!
//! This crate provides shared functionality used by the auth and api
//! services: database connectivity and migrations, the error taxonomy that
//! is turned into HTTP responses, roles and bearer tokens, the authorization
//! gate, input validation and logging setup.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod gate;
pub mod jwt;
pub mod role;
pub mod telemetry;
pub mod validation;

pub use error::{ApiError, ApiResult, DatabaseError, DatabaseResult};
pub use gate::CurrentUser;
pub use jwt::{Claims, Identity, IssuedToken, JwtConfig, JwtService};
pub use role::Role;
