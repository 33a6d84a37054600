//! HTTP error responses for ggbs-cms

use crate::sync::SyncError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Save reached the local cache only (409)
    #[error("{0}")]
    SavedLocallyOnly(String),

    /// Remote store unreachable (502)
    #[error("{0}")]
    RemoteUnavailable(String),

    /// Remote store refused the change (502)
    #[error("{0}")]
    RemoteRejected(String),

    /// Ephemeral preview submitted as content (400)
    #[error("{0}")]
    EphemeralReference(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// ggbs-common error
    #[error("Common error: {0}")]
    Common(#[from] ggbs_common::Error),
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        let message = e.to_string();
        match e {
            SyncError::NotConfigured => ApiError::SavedLocallyOnly(message),
            SyncError::RemoteUnavailable(_) => ApiError::RemoteUnavailable(message),
            SyncError::RemoteRejected(_) => ApiError::RemoteRejected(message),
            SyncError::EphemeralReference(_) => ApiError::EphemeralReference(message),
            SyncError::LocalCache(_) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::SavedLocallyOnly(msg) => (StatusCode::CONFLICT, "SAVED_LOCALLY_ONLY", msg),
            ApiError::RemoteUnavailable(msg) => (StatusCode::BAD_GATEWAY, "REMOTE_UNAVAILABLE", msg),
            ApiError::RemoteRejected(msg) => (StatusCode::BAD_GATEWAY, "REMOTE_REJECTED", msg),
            ApiError::EphemeralReference(msg) => {
                (StatusCode::BAD_REQUEST, "EPHEMERAL_REFERENCE", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(ggbs_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
