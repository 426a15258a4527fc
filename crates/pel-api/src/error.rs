//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from pel-core, pel-ledger, and pel-anchor to HTTP
//! status codes with JSON error bodies. Internal error details are never
//! exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses use this format across the API surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned
    /// to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Ingest/query validation failures surface as 422.
impl From<pel_core::ValidationError> for AppError {
    fn from(err: pel_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Store failures: a missing record is 404, a rejected anchor transition
/// is a state conflict.
impl From<pel_ledger::StoreError> for AppError {
    fn from(err: pel_ledger::StoreError) -> Self {
        match &err {
            pel_ledger::StoreError::UnknownEvent { .. } => Self::NotFound(err.to_string()),
            pel_ledger::StoreError::Transition(_) => Self::Conflict(err.to_string()),
        }
    }
}

/// Re-anchor failures: a missing record is 404, a record in the wrong
/// anchor state is a conflict.
impl From<pel_anchor::ReanchorError> for AppError {
    fn from(err: pel_anchor::ReanchorError) -> Self {
        match &err {
            pel_anchor::ReanchorError::UnknownEvent { .. } => Self::NotFound(err.to_string()),
            pel_anchor::ReanchorError::NotFailed { .. } => Self::Conflict(err.to_string()),
        }
    }
}
