//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type for the relay. Each variant
//! maps to an HTTP status code and a flat JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ConnectionId;

/// JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// { "error": "Event name is required" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Variant              | HTTP Status                |
/// |----------------------|----------------------------|
/// | `OriginRejected`     | 403 Forbidden              |
/// | `MissingEvent`       | 400 Bad Request            |
/// | `InvalidRequest`     | 400 Bad Request            |
/// | `ConnectionNotFound` | 404 Not Found              |
/// | `ReservedEvent`      | 500 Internal Server Error  |
/// | `Internal`           | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Request origin is not on the allow-list.
    #[error(
        "The CORS policy for this site does not allow access from the specified Origin: {0}"
    )]
    OriginRejected(String),

    /// Publish request without an event name.
    #[error("Event name is required")]
    MissingEvent,

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Event name is reserved for connection lifecycle and cannot be emitted.
    #[error("\"{0}\" is a reserved event name")]
    ReservedEvent(String),

    /// No live connection has the given ID.
    #[error("connection not found: {0}")]
    ConnectionNotFound(ConnectionId),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::OriginRejected(_) => StatusCode::FORBIDDEN,
            Self::MissingEvent | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::ConnectionNotFound(_) => StatusCode::NOT_FOUND,
            Self::ReservedEvent(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to HTTP callers. Server-side failures are reported
    /// generically; the detail goes to the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::ReservedEvent(_) | Self::Internal(_) => "Failed to emit event".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "error emitting event");
        }
        let body = ErrorResponse {
            error: self.public_message(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
