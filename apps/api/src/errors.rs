use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::estimate::EstimateError;

/// The only failure text a client ever sees for server-side errors.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error processing your request.";

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Uploaded file is too large.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request body exceeds the upload limit")]
    PayloadTooLarge,

    #[error("Estimate failed: {0}")]
    Estimate(#[from] EstimateError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                PAYLOAD_TOO_LARGE_MESSAGE.to_string(),
            ),
            AppError::Estimate(e) => {
                tracing::error!("Estimate error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_FAILURE_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
