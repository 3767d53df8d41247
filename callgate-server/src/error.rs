//! Axum-specific error types and mappings.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type for the gateway's HTTP surface.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Service unavailable (e.g. the engine failed to construct).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            HttpError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<callgate_core::EngineError> for HttpError {
    fn from(err: callgate_core::EngineError) -> Self {
        HttpError::ServiceUnavailable(err.to_string())
    }
}

impl From<callgate_core::RegistryError> for HttpError {
    fn from(err: callgate_core::RegistryError) -> Self {
        match err {
            callgate_core::RegistryError::NotFound(id) => HttpError::NotFound(id),
            callgate_core::RegistryError::AlreadyRegistered(id) => {
                HttpError::BadRequest(format!("session already registered: {id}"))
            }
        }
    }
}
