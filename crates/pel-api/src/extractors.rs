//! # Request Extraction & Validation
//!
//! The [`Validate`] trait for request DTOs plus helpers that turn axum's
//! JSON rejections into structured API errors instead of bare text
//! responses.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business-rule validation for request types, beyond what serde
/// deserialization already guarantees.
pub trait Validate {
    /// Validate the request. Returns a caller-facing message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization failures to
/// [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body, then run the DTO's [`Validate`] rules.
///
/// Deserialization failures become 400, validation failures 422.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
