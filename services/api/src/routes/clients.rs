//! `/api/clients`

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use common::{
    ApiError, ApiResult, CurrentUser,
    extract::{JsonBody, PathParam},
    role::{ADMIN, STAFF},
};
use tracing::info;

use crate::{
    models::{Client, ClientInput, Device},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list_clients).post(create_client))
        .route(
            "/api/clients/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
        .route("/api/clients/:id/devices", get(client_devices))
}

pub async fn list_clients(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<Vec<Client>>> {
    caller.require(STAFF)?;
    Ok(Json(state.clients.list().await?))
}

pub async fn get_client(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Client>> {
    caller.require(STAFF)?;
    Ok(Json(state.clients.get(id).await?))
}

pub async fn client_devices(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Vec<Device>>> {
    caller.require(STAFF)?;
    Ok(Json(state.clients.devices(id).await?))
}

pub async fn create_client(
    State(state): State<AppState>,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<ClientInput>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    caller.require(ADMIN)?;

    let client = state.clients.create(payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<ClientInput>,
) -> ApiResult<StatusCode> {
    caller.require(ADMIN)?;

    state.clients.update(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_client(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<StatusCode> {
    caller.require(ADMIN)?;

    if !state.clients.delete(id).await? {
        return Err(ApiError::not_found("Client", id));
    }
    info!("User {} deleted client {}", caller.id(), id);
    Ok(StatusCode::NO_CONTENT)
}
