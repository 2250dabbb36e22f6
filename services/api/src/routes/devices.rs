//! `/api/devices`

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use common::{
    ApiError, ApiResult, CurrentUser,
    extract::{JsonBody, PathParam},
    role::{ADMIN, STAFF},
};
use tracing::info;

use crate::{
    models::{Device, DeviceInput},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/devices", get(list_devices).post(create_device))
        .route("/api/devices/client/:id", get(devices_by_client))
        .route(
            "/api/devices/:id",
            get(get_device).put(update_device).delete(delete_device),
        )
}

pub async fn list_devices(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<Vec<Device>>> {
    caller.require(STAFF)?;
    Ok(Json(state.devices.list().await?))
}

pub async fn get_device(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Device>> {
    caller.require(STAFF)?;
    Ok(Json(state.devices.get(id).await?))
}

pub async fn devices_by_client(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(client_id): PathParam<i32>,
) -> ApiResult<Json<Vec<Device>>> {
    caller.require(STAFF)?;
    Ok(Json(state.devices.by_client(client_id).await?))
}

pub async fn create_device(
    State(state): State<AppState>,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<DeviceInput>,
) -> ApiResult<(StatusCode, Json<Device>)> {
    caller.require(STAFF)?;

    let device = state.devices.create(payload).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

pub async fn update_device(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<DeviceInput>,
) -> ApiResult<StatusCode> {
    caller.require(STAFF)?;

    state.devices.update(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_device(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<StatusCode> {
    caller.require(ADMIN)?;

    if !state.devices.delete(id).await? {
        return Err(ApiError::not_found("Device", id));
    }
    info!("User {} deleted device {}", caller.id(), id);
    Ok(StatusCode::NO_CONTENT)
}
