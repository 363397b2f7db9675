//! Token service HTTP client.
//!
//! Wraps the four JSON endpoints the browser client uses. No call is retried.
//!
//! # Security
//!
//! - Tokens are never logged
//! - Server error bodies are surfaced to the user verbatim, as the server
//!   already keeps them generic

use crate::config::ClientConfig;
use crate::errors::ClientError;
use common::types::{ParticipantIdentity, RoomName};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token format received from server";
pub const MISSING_URL_MESSAGE: &str = "Missing LiveKit URL in server response";
pub const MISSING_EXISTS_MESSAGE: &str = "Missing room status in server response";

/// What the session needs to connect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDetails {
    pub token: String,
    pub url: String,
    /// Role the server granted. Absent means participant.
    pub is_room_creator: bool,
}

impl std::fmt::Debug for ConnectionDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDetails")
            .field("token", &"[REDACTED]")
            .field("url", &self.url)
            .field("is_room_creator", &self.is_room_creator)
            .finish()
    }
}

#[derive(Clone)]
pub struct TokenClient {
    client: Client,
    base_url: String,
}

impl TokenClient {
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.token_service_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request an access token for `participant_name` in `room_name`.
    ///
    /// # Errors
    ///
    /// - `ClientError::ServerError` on a non-2xx status
    /// - `ClientError::InvalidResponse` if the body lacks a string `token` or `url`
    /// - `ClientError::Transport` if the service is unreachable
    #[instrument(skip(self), fields(room = %room_name, participant = %participant_name))]
    pub async fn request_token(
        &self,
        room_name: &RoomName,
        participant_name: &ParticipantIdentity,
        is_creator: bool,
    ) -> Result<ConnectionDetails, ClientError> {
        let body = self
            .post(
                "/get-token",
                &json!({
                    "roomName": room_name.as_str(),
                    "participantName": participant_name.as_str(),
                    "isRoomCreator": is_creator,
                }),
            )
            .await?;

        let token = non_empty_str(&body, "token")
            .ok_or_else(|| ClientError::InvalidResponse(INVALID_TOKEN_MESSAGE.to_string()))?;
        let url = non_empty_str(&body, "url")
            .ok_or_else(|| ClientError::InvalidResponse(MISSING_URL_MESSAGE.to_string()))?;

        let is_room_creator = body
            .get("isRoomCreator")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        debug!(target: "room_client.token_client", url = %url, is_room_creator, "Received access token");

        Ok(ConnectionDetails {
            token: token.to_string(),
            url: url.to_string(),
            is_room_creator,
        })
    }

    /// Whether the room already exists on the media server.
    #[instrument(skip(self), fields(room = %room_name))]
    pub async fn check_room(&self, room_name: &RoomName) -> Result<bool, ClientError> {
        let body = self
            .post("/check-room", &json!({ "roomName": room_name.as_str() }))
            .await?;

        body.get("exists")
            .and_then(Value::as_bool)
            .ok_or_else(|| ClientError::InvalidResponse(MISSING_EXISTS_MESSAGE.to_string()))
    }

    #[instrument(skip(self, metadata), fields(room = %room_name))]
    pub async fn set_room_metadata(
        &self,
        room_name: &RoomName,
        metadata: &Value,
    ) -> Result<(), ClientError> {
        self.post(
            "/set-room-metadata",
            &json!({ "roomName": room_name.as_str(), "metadata": metadata }),
        )
        .await
        .map(|_| ())
    }

    /// Ask the service to end the room for everyone.
    #[instrument(skip(self), fields(room = %room_name, participant = %participant_id))]
    pub async fn end_room(
        &self,
        room_name: &RoomName,
        participant_id: &ParticipantIdentity,
    ) -> Result<(), ClientError> {
        self.post(
            "/end-room",
            &json!({
                "roomName": room_name.as_str(),
                "participantId": participant_id.as_str(),
            }),
        )
        .await
        .map(|_| ())
    }

    /// POST `body` and return the JSON response body.
    ///
    /// A 2xx body that is not JSON comes back as `Value::Null`, so callers
    /// report the field they were looking for.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "room_client.token_client", error = %e, path, "Token service request failed");
                ClientError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                debug!(target: "room_client.token_client", error = %e, path, "Response body is not JSON");
                Value::Null
            }
        };

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

            warn!(
                target: "room_client.token_client",
                status = status.as_u16(),
                error = %message,
                path,
                "Token service returned an error"
            );

            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

fn non_empty_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
