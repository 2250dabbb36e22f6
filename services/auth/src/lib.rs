//! Authentication service
//!
//! Registers accounts, verifies credentials and issues the bearer tokens the
//! api service accepts. Also serves the user administration endpoints.

pub mod authenticator;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod state;

pub use authenticator::Authenticator;
pub use routes::create_router;
pub use state::AppState;
