//! API service routes
//!
//! Each resource contributes its own routes; role and ownership checks are
//! made in the handlers through [`common::CurrentUser`].

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod clients;
pub mod devices;
pub mod repair_orders;
pub mod services;
pub mod technicians;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(clients::routes())
        .merge(devices::routes())
        .merge(services::routes())
        .merge(technicians::routes())
        .merge(repair_orders::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}
