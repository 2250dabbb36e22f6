//! `/api/services`
//!
//! Reading the catalog needs no token; changing it is for admins.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use common::{
    ApiError, ApiResult, CurrentUser,
    extract::{JsonBody, PathParam, QueryParams},
    role::ADMIN,
};
use tracing::info;

use crate::{
    models::{PopularQuery, PriceRange, Service, ServiceInput},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/services", get(list_services).post(create_service))
        .route("/api/services/popular", get(popular_services))
        .route("/api/services/price-range", get(services_by_price))
        .route(
            "/api/services/:id",
            get(get_service).put(update_service).delete(delete_service),
        )
}

pub async fn list_services(State(state): State<AppState>) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(state.services.list().await?))
}

pub async fn get_service(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Service>> {
    Ok(Json(state.services.get(id).await?))
}

/// Most ordered services, `?top=` defaults to 5
pub async fn popular_services(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PopularQuery>,
) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(state.services.popular(query).await?))
}

pub async fn services_by_price(
    State(state): State<AppState>,
    QueryParams(range): QueryParams<PriceRange>,
) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(state.services.by_price_range(range).await?))
}

pub async fn create_service(
    State(state): State<AppState>,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<ServiceInput>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    caller.require(ADMIN)?;

    let service = state.services.create(payload).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<ServiceInput>,
) -> ApiResult<StatusCode> {
    caller.require(ADMIN)?;

    state.services.update(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_service(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<StatusCode> {
    caller.require(ADMIN)?;

    if !state.services.delete(id).await? {
        return Err(ApiError::not_found("Service", id));
    }
    info!("User {} removed service {}", caller.id(), id);
    Ok(StatusCode::NO_CONTENT)
}
