//! Token Service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. The body
//! is always `{"error": "<message>"}`, which is the shape browser clients
//! read their failure message from. Upstream details are logged server-side
//! and replaced by a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Token Service error type.
///
/// Maps to HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - Forbidden: 403 Forbidden
/// - NotFound: 404 Not Found
/// - TokenGeneration, Internal: 500 Internal Server Error
/// - RoomService: 502 Bad Gateway
#[derive(Debug, Error)]
pub enum TsError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to generate token: {0}")]
    TokenGeneration(String),

    #[error("Room service error: {0}")]
    RoomService(String),

    #[error("Internal server error")]
    Internal,
}

impl TsError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            TsError::BadRequest(_) => 400,
            TsError::Forbidden(_) => 403,
            TsError::NotFound(_) => 404,
            TsError::TokenGeneration(_) | TsError::Internal => 500,
            TsError::RoomService(_) => 502,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for TsError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            TsError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            TsError::Forbidden(reason) => (StatusCode::FORBIDDEN, reason.clone()),
            TsError::NotFound(resource) => (StatusCode::NOT_FOUND, resource.clone()),
            TsError::TokenGeneration(reason) => {
                tracing::error!(target: "ts.errors", error = %reason, "Error generating token");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to generate token: {}", reason),
                )
            }
            TsError::RoomService(reason) => {
                // Log actual reason server-side
                tracing::warn!(target: "ts.errors", reason = %reason, "Room service request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Room service temporarily unavailable".to_string(),
                )
            }
            TsError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            ),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
