use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ayurtrace_ledger::LedgerError;
use serde::Serialize;
use thiserror::Error;

/// API-facing errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::NotFound(msg) => Self::NotFound(msg),
            LedgerError::InvalidInput(msg) => Self::Validation(msg),
            LedgerError::Serialization(msg) => Self::Internal(msg),
            LedgerError::LockPoisoned => Self::Internal("ledger lock poisoned".into()),
            LedgerError::IntegrityViolation { record_id, reason } => {
                Self::Internal(format!("chain integrity violation at {record_id}: {reason}"))
            }
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
