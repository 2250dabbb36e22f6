//! Repair shop api service
//!
//! Serves clients, devices, the service catalog, technicians and repair
//! orders. Every caller is identified by a bearer token issued by the auth
//! service.

pub mod domain;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
