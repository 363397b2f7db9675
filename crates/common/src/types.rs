//! Validated name types shared by the token service and the room client.
//!
//! Room names and participant identities are opaque strings. The only rule
//! applied is that they are trimmed and must not be empty afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced when parsing a name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The value was empty or whitespace only.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Name of a media room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Parse a raw room name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `NameError::Empty` if nothing remains after trimming.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty("room name"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a participant, unique within a room session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantIdentity(String);

impl ParticipantIdentity {
    /// Parse a raw participant name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `NameError::Empty` if nothing remains after trimming.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty("participant name"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased first character, used as the video placeholder.
    #[must_use]
    pub fn initial(&self) -> String {
        self.0
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for ParticipantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantIdentity {
    /// Wrap an identity reported by the media server without validation.
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_room_name_is_trimmed() {
        let room = RoomName::parse("  standup  ").unwrap();
        assert_eq!(room.as_str(), "standup");
    }

    #[test]
    fn test_room_name_rejects_blank() {
        assert_eq!(
            RoomName::parse("   "),
            Err(NameError::Empty("room name"))
        );
    }

    #[test]
    fn test_identity_rejects_empty() {
        let err = ParticipantIdentity::parse("").unwrap_err();
        assert_eq!(err.to_string(), "participant name must not be empty");
    }

    #[test]
    fn test_identity_initial_is_uppercase() {
        let identity = ParticipantIdentity::parse("alice").unwrap();
        assert_eq!(identity.initial(), "A");
    }

    #[test]
    fn test_identity_initial_handles_multibyte() {
        let identity = ParticipantIdentity::from("ßven");
        assert_eq!(identity.initial(), "SS");
    }

    #[test]
    fn test_identity_serializes_as_plain_string() {
        let identity = ParticipantIdentity::from("bob");
        assert_eq!(serde_json::to_string(&identity).unwrap(), "\"bob\"");
    }
}
