//! Room backend backed by the media server's Twirp room service.
//!
//! Calls `POST {host}/twirp/livekit.RoomService/<Method>` with JSON bodies,
//! authorized by a short-lived server token.
//!
//! # Security
//!
//! - Server tokens are minted per call with `roomAdmin` scoped to one room
//! - Tokens are never logged
//! - Upstream error bodies are logged server-side only

use crate::config::Config;
use crate::errors::TsError;
use crate::models::RoomInfo;
use crate::observability::metrics;
use crate::services::room_backend::RoomBackend;
use crate::services::token_issuer::issue_server_token;
use common::types::RoomName;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, instrument, warn};

/// Timeout for room service requests in seconds.
const ROOM_SERVICE_TIMEOUT_SECS: u64 = 10;

const TWIRP_PREFIX: &str = "/twirp/livekit.RoomService";

#[derive(Serialize)]
struct ListRoomsRequest<'a> {
    names: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ListRoomsResponse {
    #[serde(default)]
    rooms: Vec<RoomInfo>,
}

#[derive(Serialize)]
struct CreateRoomRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct UpdateRoomMetadataRequest<'a> {
    room: &'a str,
    metadata: &'a str,
}

#[derive(Serialize)]
struct DeleteRoomRequest<'a> {
    room: &'a str,
}

/// Convert the client-facing WebSocket URL into the HTTP(S) API base URL.
pub fn http_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if let Some(rest) = host.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = host.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        host.to_string()
    }
}

/// HTTP client for the media server's room service.
#[derive(Clone)]
pub struct LiveKitRoomBackend {
    client: Client,
    base_url: String,
    config: Config,
}

impl LiveKitRoomBackend {
    /// Create a backend talking to the server named by `config.livekit_host`.
    ///
    /// # Errors
    ///
    /// Returns `TsError::Internal` if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, TsError> {
        let base_url = http_base_url(&config.livekit_host);
        Self::with_base_url(config, base_url)
    }

    /// Create a backend with an explicit API base URL.
    ///
    /// # Errors
    ///
    /// Returns `TsError::Internal` if the HTTP client cannot be built.
    pub fn with_base_url(config: Config, base_url: String) -> Result<Self, TsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(ROOM_SERVICE_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "ts.services.livekit", error = %e, "Failed to build HTTP client");
                TsError::Internal
            })?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    async fn call<Req, Resp>(
        &self,
        method: &'static str,
        room: Option<&RoomName>,
        body: &Req,
    ) -> Result<Resp, TsError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let result = self.send(method, room, body).await;
        let status = match &result {
            Ok(_) => "success",
            Err(TsError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        metrics::record_room_backend_request(method, status);
        result
    }

    async fn send<Req, Resp>(
        &self,
        method: &'static str,
        room: Option<&RoomName>,
        body: &Req,
    ) -> Result<Resp, TsError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let url = format!("{}{}/{}", self.base_url, TWIRP_PREFIX, method);
        let token = issue_server_token(&self.config, room)?;

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "ts.services.livekit", error = %e, method, "Room service request failed");
                TsError::RoomService(format!("{} request failed", method))
            })?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                error!(target: "ts.services.livekit", error = %e, method, "Failed to parse room service response");
                TsError::RoomService(format!("{} returned an unreadable body", method))
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(TsError::NotFound("Room not found".to_string()))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            warn!(
                target: "ts.services.livekit",
                status = %status,
                body = %error_body,
                method,
                "Room service returned an error"
            );
            Err(TsError::RoomService(format!(
                "{} returned status {}",
                method, status
            )))
        }
    }
}

#[async_trait::async_trait]
impl RoomBackend for LiveKitRoomBackend {
    #[instrument(skip(self), fields(room = %room))]
    async fn get_room(&self, room: &RoomName) -> Result<Option<RoomInfo>, TsError> {
        let response: ListRoomsResponse = self
            .call(
                "ListRooms",
                None,
                &ListRoomsRequest {
                    names: vec![room.as_str()],
                },
            )
            .await?;

        Ok(response
            .rooms
            .into_iter()
            .find(|info| info.name == room.as_str()))
    }

    #[instrument(skip(self), fields(room = %room))]
    async fn ensure_room(&self, room: &RoomName) -> Result<RoomInfo, TsError> {
        self.call(
            "CreateRoom",
            None,
            &CreateRoomRequest {
                name: room.as_str(),
            },
        )
        .await
    }

    #[instrument(skip(self, metadata), fields(room = %room))]
    async fn update_room_metadata(
        &self,
        room: &RoomName,
        metadata: &str,
    ) -> Result<RoomInfo, TsError> {
        self.call(
            "UpdateRoomMetadata",
            Some(room),
            &UpdateRoomMetadataRequest {
                room: room.as_str(),
                metadata,
            },
        )
        .await
    }

    #[instrument(skip(self), fields(room = %room))]
    async fn delete_room(&self, room: &RoomName) -> Result<(), TsError> {
        let _: serde_json::Value = self
            .call(
                "DeleteRoom",
                Some(room),
                &DeleteRoomRequest {
                    room: room.as_str(),
                },
            )
            .await?;
        Ok(())
    }
}
