use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Error code carried by injected write failures. The sync client keys its
/// "network error" classification on it.
pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Per-question validation failures for an assessment submission.
    #[error("Submission rejected: {} question(s) failed validation", .0.len())]
    InvalidSubmission(BTreeMap<Uuid, String>),

    /// Simulated transport failure from the network simulator.
    #[error("Network error: Please try again")]
    Network,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::InvalidSubmission(errors) => {
                let body = Json(json!({
                    "error": {
                        "code": "INVALID_SUBMISSION",
                        "message": self.to_string(),
                        "details": errors,
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::Network => {
                tracing::warn!("Injected network failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    NETWORK_ERROR_CODE,
                    self.to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
