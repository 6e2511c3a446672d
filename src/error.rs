// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Normal negative outcomes (insufficient balance, completing an
/// already-done task) are NOT errors; handlers return them as structured
/// results. This enum covers authentication failures and system faults.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, invalid, or expired credential, or a token without an
    /// email claim. All verification failures collapse into this variant
    /// so the caller learns nothing about which check failed.
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal consistency failure, e.g. a resolved principal with no
    /// backing user record. Logged with detail, surfaced without it.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Persistence layer unreachable or timed out. Mutations are single
    /// atomic operations, so the whole request is safe to retry.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            // Code and status are what API clients key off for re-login.
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::InvariantViolation(msg) => {
                tracing::error!(error = %msg, "Invariant violation");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Store error");
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
