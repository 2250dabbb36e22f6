//! `/api/technicians`

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use common::{
    ApiError, ApiResult, CurrentUser,
    extract::{JsonBody, PathParam},
    role::{ADMIN, STAFF},
};
use tracing::info;

use crate::{
    models::{RepairOrder, Technician, TechnicianInput},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/technicians", get(list_technicians).post(create_technician))
        .route("/api/technicians/active", get(active_technicians))
        .route(
            "/api/technicians/specialization/:name",
            get(technicians_by_specialization),
        )
        .route(
            "/api/technicians/:id",
            get(get_technician)
                .put(update_technician)
                .delete(delete_technician),
        )
        .route("/api/technicians/:id/orders", get(technician_orders))
}

pub async fn list_technicians(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Technician>>> {
    Ok(Json(state.technicians.list().await?))
}

pub async fn get_technician(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Technician>> {
    Ok(Json(state.technicians.get(id).await?))
}

pub async fn technicians_by_specialization(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> ApiResult<Json<Vec<Technician>>> {
    Ok(Json(state.technicians.by_specialization(&name).await?))
}

pub async fn active_technicians(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<Vec<Technician>>> {
    caller.require(STAFF)?;
    Ok(Json(state.technicians.active().await?))
}

pub async fn technician_orders(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Vec<RepairOrder>>> {
    caller.require(STAFF)?;
    Ok(Json(state.technicians.orders(id).await?))
}

pub async fn create_technician(
    State(state): State<AppState>,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<TechnicianInput>,
) -> ApiResult<(StatusCode, Json<Technician>)> {
    caller.require(ADMIN)?;

    let technician = state.technicians.create(payload).await?;
    Ok((StatusCode::CREATED, Json(technician)))
}

/// Technicians may update only their own record
pub async fn update_technician(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<TechnicianInput>,
) -> ApiResult<StatusCode> {
    caller.require(STAFF)?;
    caller.may_edit_technician(id)?;

    state.technicians.update(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_technician(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<StatusCode> {
    caller.require(ADMIN)?;

    if !state.technicians.delete(id).await? {
        return Err(ApiError::not_found("Technician", id));
    }
    info!("User {} removed technician {}", caller.id(), id);
    Ok(StatusCode::NO_CONTENT)
}
