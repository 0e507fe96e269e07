//! Error types for the API
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// == API Error Enum ==
/// Unified error type for the API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Write conflicts with existing data
    #[error("{0}")]
    Conflict(String),

    /// Invalid request data
    #[error("{0}")]
    InvalidRequest(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Upstream data provider failure
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Upstream data provider has no such resource
    #[error("{0}")]
    UpstreamNotFound(String),

    /// Upstream data provider rate limit exceeded
    #[error("upstream rate limit exceeded")]
    UpstreamRateLimited,

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Database(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "not found".to_string())
            }
            ApiError::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database error".to_string())
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::UpstreamNotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::UpstreamRateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, self.to_string())
            }
            ApiError::Internal(msg) => {
                error!(message = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the API.
pub type Result<T> = std::result::Result<T, ApiError>;
