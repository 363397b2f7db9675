//! Error types for the room client.
//!
//! Display strings are what the user sees after a "Failed to ..." prefix,
//! so they carry the server or device message verbatim.

use crate::events::EventKind;
use thiserror::Error;

/// Token service call failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Non-2xx response. `message` is the body's `error` field when present.
    #[error("{message}")]
    ServerError { status: u16, message: String },

    /// 2xx response whose body is missing a required field.
    #[error("{0}")]
    InvalidResponse(String),

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(String),
}

impl ClientError {
    /// HTTP status for server errors, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Room session failures reported by the media SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Not connected to room")]
    NotConnected,

    #[error("{0}")]
    Connect(String),

    /// Camera, microphone or screen capture could not be enabled.
    #[error("{0}")]
    Device(String),

    #[error("{0}")]
    Metadata(String),

    #[error("{0}")]
    Disconnect(String),
}

/// A track could not be bound to a rendering element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("element {0} does not exist")]
    MissingElement(String),

    #[error("attach rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("a handler for {0} is already registered")]
    DuplicateHandler(EventKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_displays_server_message() {
        let err = ClientError::ServerError {
            status: 400,
            message: "Missing room name or participant name".to_string(),
        };
        assert_eq!(err.to_string(), "Missing room name or participant name");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_transport_has_no_status() {
        assert_eq!(ClientError::Transport("refused".to_string()).status(), None);
    }

    #[test]
    fn test_duplicate_handler_names_kind() {
        let err = DispatchError::DuplicateHandler(EventKind::TrackSubscribed);
        assert_eq!(
            err.to_string(),
            "a handler for track_subscribed is already registered"
        );
    }
}
