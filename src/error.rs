use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Error taxonomy of the registry API.
///
/// Every variant is recovered at the request boundary and rendered as
/// an `ErrorResponse` envelope; none of them crash the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("a student with this email already exists")]
    DuplicateEmail,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("internal server error")]
    Internal(String),
    #[error("database error")]
    Database(#[from] DbErr),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::DuplicateEmail => (StatusCode::CONFLICT, "DUPLICATE_EMAIL"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log the detail server-side; the client only sees the generic message.
        match &self {
            ApiError::Database(e) => error!("database error: {}", e),
            ApiError::Internal(detail) => error!("internal error: {}", detail),
            _ => {}
        }

        let (status, code) = self.status_and_code();
        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            success: false,
        };

        (status, Json(body)).into_response()
    }
}
