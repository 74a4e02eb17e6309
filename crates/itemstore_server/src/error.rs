//! # HTTP Errors
//!
//! Error types for the HTTP surface and the status/body each one maps to.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use itemstore_core::db::ConnectionStringError;
use itemstore_core::{DbError, FieldIssue, ItemId, ItemValidationError, RepoError};
use log::error;
use serde::Serialize;
use thiserror::Error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Request-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Item payload failed field validation
    #[error("{0}")]
    Validation(#[from] ItemValidationError),

    /// Path, query or body could not be decoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Item already exists")]
    Conflict(ItemId),

    #[error("Item not found")]
    NotFound(ItemId),

    /// Payload id differs from the path id on update
    #[error("ID mismatch")]
    IdMismatch { path_id: ItemId, body_id: ItemId },

    /// Store failure; details are logged, never returned
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidRequest(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::IdMismatch { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(err) => ApiError::Validation(err),
            RepoError::NotFound(id) => ApiError::NotFound(id),
            RepoError::Conflict(id) => ApiError::Conflict(id),
            RepoError::IdMismatch { path_id, body_id } => {
                ApiError::IdMismatch { path_id, body_id }
            }
            other @ (RepoError::Db(_) | RepoError::InvalidData(_)) => {
                ApiError::Internal(other.to_string())
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldIssue>),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: ErrorDetail,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            ApiError::Validation(err) => ErrorDetail::Fields(err.issues().to_vec()),
            ApiError::Internal(cause) => {
                error!(
                    "event=http_error module=server status=error code={} error={}",
                    status.as_u16(),
                    cause
                );
                ErrorDetail::Message(INTERNAL_ERROR_MESSAGE.to_string())
            }
            other => ErrorDetail::Message(other.to_string()),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Startup and shutdown failures of the server process
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConnectionStringError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Invalid listen address `{0}`")]
    ListenAddr(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
