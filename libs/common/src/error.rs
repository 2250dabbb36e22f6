//! Error types shared by the services
//!
//! `DatabaseError` classifies storage failures; `ApiError` is the single error
//! returned by handlers and is turned into an HTTP response exactly once, as a
//! `{"error": "<message>"}` body.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::Error as SqlxError;
use std::fmt::Display;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign key did not resolve
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return DatabaseError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::ForeignKeyViolation(constraint);
            }
        }
        DatabaseError::Query(err)
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error returned by every handler
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// The addressed entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Missing, malformed or expired bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Login failed; unknown email and wrong password are indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Authenticated but not permitted
    #[error("{0}")]
    Forbidden(String),

    /// Email or username already registered
    #[error("{0}")]
    DuplicateIdentity(String),

    /// A referenced entity does not exist
    #[error("{0}")]
    InvalidReference(String),

    /// Login attempts exhausted for this email
    #[error("Too many login attempts, try again later")]
    TooManyRequests,

    /// Anything else; detail is logged, never returned
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ApiError {
    /// Log `err` and wrap it as an opaque 500
    pub fn internal(err: impl Display) -> Self {
        tracing::error!("Internal error: {}", err);
        ApiError::Internal(err.to_string())
    }

    pub fn not_found(what: &str, id: i32) -> Self {
        ApiError::NotFound(format!("{} with id {} not found", what, id))
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::DuplicateIdentity(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidReference(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::TooManyRequests => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(DatabaseError::UniqueViolation(_)) => (
                StatusCode::BAD_REQUEST,
                "A record with the same unique value already exists".to_string(),
            ),
            ApiError::Database(DatabaseError::ForeignKeyViolation(_)) => (
                StatusCode::BAD_REQUEST,
                "A referenced record does not exist".to_string(),
            ),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_and_message().0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(err) = &self {
            if self.status().is_server_error() {
                tracing::error!("Database error: {}", err);
            }
        }

        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
