//! Routing errors.
//!
//! # Responsibilities
//! - `RouterError`: faults while building the router (bad paths, bad config)
//! - `RouteError`: faults raised by handlers, translated to HTTP responses
//!
//! # Design Decisions
//! - Error bodies are JSON: `{"error": <message>, "status": <code>}`
//! - Server-side failures (5xx) are logged; client errors are not

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::storage::StorageError;

/// Errors raised while constructing or configuring a router.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("invalid route path `{0}`: {1}")]
    InvalidPath(String, &'static str),

    #[error("route `{0}` is already registered")]
    DuplicateRoute(String),

    #[error("route `{0}` conflicts with registered route `{1}`")]
    ConflictingRoute(String, String),

    #[error("invalid base path `{0}`: must start with '/' and not end with '/'")]
    InvalidBasePath(String),

    #[error("invalid CORS origin `{0}`")]
    InvalidCorsOrigin(String),

    #[error("CORS policy allows no origin; list origins or use \"*\"")]
    EmptyCorsOrigins,

    #[error("invalid CORS method `{0}`")]
    InvalidCorsMethod(String),

    #[error("invalid CORS header `{0}`")]
    InvalidCorsHeader(String),

    #[error("request timeout must be greater than zero")]
    InvalidTimeout,
}

/// Errors returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Internal(String),
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RouteError::NotFound(_) => StatusCode::NOT_FOUND,
            RouteError::Conflict(_) => StatusCode::CONFLICT,
            RouteError::Storage(_) | RouteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Handler failed");
        }
        error_response(status, &self.to_string())
    }
}

/// Build the JSON error body used for every routing failure.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": message,
            "status": status.as_u16(),
        })),
    )
        .into_response()
}
