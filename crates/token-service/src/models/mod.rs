//! Token Service models.
//!
//! Request and response bodies for the HTTP API. Bodies use camelCase field
//! names, matching what browser clients send. Request string fields default
//! to empty so that a missing field reaches handler validation and yields the
//! service's own 400 message.

use serde::{Deserialize, Serialize};

/// Body of `POST /get-token`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTokenRequest {
    #[serde(default)]
    pub room_name: String,

    #[serde(default)]
    pub participant_name: String,

    /// Set by the client that believes it is creating the room.
    #[serde(default)]
    pub is_room_creator: bool,
}

/// Response of `POST /get-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Signed access token.
    pub token: String,

    /// Media server URL to connect to.
    pub url: String,

    /// Whether the token carries the creator role.
    pub is_room_creator: bool,
}

/// Body of `POST /check-room`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRoomRequest {
    #[serde(default)]
    pub room_name: String,
}

/// Response of `POST /check-room`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRoomResponse {
    pub exists: bool,
}

/// Body of `POST /set-room-metadata`.
///
/// `metadata` may be any JSON value. Strings are stored verbatim, anything
/// else is stored as its JSON serialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoomMetadataRequest {
    #[serde(default)]
    pub room_name: String,

    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl SetRoomMetadataRequest {
    /// Metadata as the string stored on the room.
    pub fn metadata_string(&self) -> String {
        match &self.metadata {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Body of `POST /end-room`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndRoomRequest {
    #[serde(default)]
    pub room_name: String,

    #[serde(default)]
    pub participant_id: String,
}

/// Generic success acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Room as reported by a room backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    #[serde(default)]
    pub sid: String,

    pub name: String,

    #[serde(default)]
    pub metadata: String,

    #[serde(default, alias = "numParticipants")]
    pub num_participants: u32,

    #[serde(default, alias = "creationTime", deserialize_with = "deserialize_creation_time")]
    pub creation_time: i64,
}

/// Accepts `creation_time` as either a JSON number or a decimal string
/// (protobuf JSON encodes int64 as a string).
fn deserialize_creation_time<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) if s.is_empty() => Ok(0),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
