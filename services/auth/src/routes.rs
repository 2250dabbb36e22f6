//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use common::{
    ApiError, ApiResult, CurrentUser, Role,
    extract::{JsonBody, PathParam},
    role::{ADMIN, ANY},
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    models::{
        AuthResponse, LoginRequest, PublicRegisterRequest, RegisterRequest, UpdateRoleRequest,
        UserResponse,
    },
    state::AppState,
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/register-user", post(register_user))
        .route("/api/auth/login", post(login))
        .route("/api/users", get(list_users))
        .route("/api/users/profile", get(profile))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id/role", put(update_role))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Register an account
///
/// Anyone may create a plain user; any other role or a technician/client link
/// needs an administrator's token.
pub async fn register(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if !payload.is_self_service() {
        match &caller {
            Some(admin) => admin.require(ADMIN)?,
            None => {
                warn!("Anonymous attempt to register a privileged account");
                return Err(ApiError::Unauthorized);
            }
        }
    }

    info!("Registration request for {}", payload.email);

    let (issued, user) = state.authenticator.register(payload).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(issued, user))))
}

/// Public sign-up; the role is always `User`
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PublicRegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Public registration request for {}", payload.email);

    let (issued, user) = state.authenticator.register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(issued, user))))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    info!("Login attempt for {}", payload.email);

    let (issued, user) = state
        .authenticator
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(AuthResponse::new(issued, user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    caller.require(ADMIN)?;

    let users = state
        .user_repository
        .list()
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// The caller's own account, looked up fresh
pub async fn profile(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    caller.require(ANY)?;

    let user = state
        .user_repository
        .find_by_id(caller.id())
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("User", caller.id()))?;
    Ok(Json(user.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<UserResponse>> {
    caller.require(ADMIN)?;

    let user = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    Ok(Json(user.into()))
}

/// Change a user's role
///
/// Tokens already issued keep the old role until they expire.
pub async fn update_role(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<UpdateRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    caller.require(ADMIN)?;

    let role: Role = payload
        .role
        .parse()
        .map_err(|e: common::role::UnknownRole| ApiError::Validation(e.to_string()))?;

    let user = state
        .user_repository
        .update_role(id, role, payload.technician_id, payload.client_id)
        .await
        .map_err(|e| match e {
            common::DatabaseError::ForeignKeyViolation(_) => ApiError::InvalidReference(
                "Linked technician or client does not exist".to_string(),
            ),
            other => ApiError::internal(other),
        })?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    info!("User {} changed role of user {} to {}", caller.id(), id, role);
    Ok(Json(user.into()))
}
