//! `/api/repairorders`
//!
//! Staff read every order. Technicians change only the orders assigned to
//! them, and plain users see the orders for their own devices.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use common::{
    ApiError, ApiResult, CurrentUser,
    extract::{JsonBody, PathParam},
    role::{ADMIN, ANY, STAFF},
};
use tracing::info;

use crate::{
    models::{CreateOrderInput, OrderStatistics, RepairOrder, StatusUpdate, UpdateOrderInput},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/repairorders", get(list_orders).post(create_order))
        .route("/api/repairorders/my-orders", get(my_orders))
        .route("/api/repairorders/statistics", get(statistics))
        .route("/api/repairorders/status/:status", get(orders_by_status))
        .route("/api/repairorders/technician/:id", get(orders_by_technician))
        .route("/api/repairorders/client/:id", get(orders_by_client))
        .route(
            "/api/repairorders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/api/repairorders/:id/status", patch(update_status))
}

pub async fn list_orders(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<Vec<RepairOrder>>> {
    caller.require(STAFF)?;
    Ok(Json(state.orders.list().await?))
}

/// Orders the caller owns or is assigned to; everything for admins
pub async fn my_orders(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<Vec<RepairOrder>>> {
    caller.require(ANY)?;
    Ok(Json(state.orders.scoped(caller.order_scope()).await?))
}

pub async fn statistics(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<OrderStatistics>> {
    caller.require(ADMIN)?;
    Ok(Json(state.orders.statistics().await?))
}

pub async fn orders_by_status(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(status): PathParam<String>,
) -> ApiResult<Json<Vec<RepairOrder>>> {
    caller.require(STAFF)?;
    Ok(Json(state.orders.by_status(&status).await?))
}

pub async fn orders_by_technician(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(technician_id): PathParam<i32>,
) -> ApiResult<Json<Vec<RepairOrder>>> {
    caller.require(STAFF)?;
    Ok(Json(state.orders.by_technician(technician_id).await?))
}

pub async fn orders_by_client(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(client_id): PathParam<i32>,
) -> ApiResult<Json<Vec<RepairOrder>>> {
    caller.require(STAFF)?;
    Ok(Json(state.orders.by_client(client_id).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<RepairOrder>> {
    caller.require(ANY)?;

    let order = state.orders.get(id).await?;
    caller.may_view_order(&order)?;
    Ok(Json(order))
}

pub async fn create_order(
    State(state): State<AppState>,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<CreateOrderInput>,
) -> ApiResult<(StatusCode, Json<RepairOrder>)> {
    caller.require(STAFF)?;

    let order = state.orders.create(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<UpdateOrderInput>,
) -> ApiResult<StatusCode> {
    caller.require(STAFF)?;
    caller.may_modify_order(&state.orders.get(id).await?)?;

    state.orders.update(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_status(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<StatusUpdate>,
) -> ApiResult<Json<RepairOrder>> {
    caller.require(STAFF)?;
    caller.may_modify_order(&state.orders.get(id).await?)?;

    let order = state.orders.update_status(id, &payload.status).await?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<StatusCode> {
    caller.require(ADMIN)?;

    if !state.orders.delete(id).await? {
        return Err(ApiError::not_found("Repair order", id));
    }
    info!("User {} deleted repair order {}", caller.id(), id);
    Ok(StatusCode::NO_CONTENT)
}
