//! Error responses shared by all routes.
//!
//! Every failure is returned as `{error, message, details?}` with a
//! machine-readable `error` code.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::models::LogValidationError;
use shared::query::{FieldError, QueryError};
use std::fmt::Display;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
    /// Per-field validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// A status code paired with an error body.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Builds an error response.
pub fn api_error(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }),
    )
}

/// 400 with per-field details.
pub fn validation_failed(details: Vec<FieldError>) -> ApiError {
    let message = format!("{} field(s) failed validation", details.len());
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "validation_failed".to_string(),
            message,
            details: Some(details),
        }),
    )
}

/// 404 for a log id outside the caller's tenant.
pub fn log_not_found(id: impl Display) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("Log entry {id} not found"),
    )
}

/// 500 with an opaque body; the cause is only logged.
pub fn storage_error(cause: &impl Display) -> ApiError {
    tracing::error!(error = %cause, "Storage operation failed");
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_error",
        "The log store could not complete the request",
    )
}

impl From<LogValidationError> for ErrorResponse {
    fn from(e: LogValidationError) -> Self {
        Self {
            error: "validation_failed".to_string(),
            message: e.to_string(),
            details: Some(
                e.field_errors()
                    .into_iter()
                    .map(|(field, message)| FieldError { field, message })
                    .collect(),
            ),
        }
    }
}

/// 400 for an entry that fails model validation.
pub fn invalid_entry(e: LogValidationError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(e)))
}

/// Maps a query failure to its HTTP response.
pub fn query_error(e: QueryError) -> ApiError {
    match e {
        QueryError::Validation(details) => validation_failed(details),
        QueryError::Storage(cause) => storage_error(&cause),
    }
}
