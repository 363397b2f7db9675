//! Participant and server token minting.
//!
//! Wraps `common::jwt::AccessToken` with the service's configuration:
//! issuer, signing secret and token lifetime.

use crate::config::Config;
use crate::errors::TsError;
use crate::observability::metrics;
use common::jwt::{AccessToken, VideoGrant, SERVER_TOKEN_TTL};
use common::types::{ParticipantIdentity, RoomName};
use std::time::Duration;
use tracing::instrument;

/// Role a participant token is minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRole {
    Participant,
    Creator,
}

impl TokenRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRole::Participant => "participant",
            TokenRole::Creator => "creator",
        }
    }
}

/// Mint a browser token for `identity` in `room`.
///
/// # Errors
///
/// Returns `TsError::TokenGeneration` if signing fails.
#[instrument(skip(config), fields(room = %room, identity = %identity, role = role.as_str()))]
pub fn issue_participant_token(
    config: &Config,
    room: &RoomName,
    identity: &ParticipantIdentity,
    role: TokenRole,
) -> Result<String, TsError> {
    let grant = match role {
        TokenRole::Participant => VideoGrant::participant(room.as_str()),
        TokenRole::Creator => VideoGrant::creator(room.as_str()),
    };

    let token = AccessToken::new(&config.api_key, &config.api_secret)
        .with_identity(identity.as_str())
        .with_name(identity.as_str())
        .with_ttl(Duration::from_secs(config.token_ttl_seconds))
        .with_grant(grant)
        .to_jwt()
        .map_err(|e| TsError::TokenGeneration(e.to_string()))?;

    metrics::record_token_issued(role.as_str());

    Ok(token)
}

/// Mint a short-lived token authorizing the service to call the room API.
///
/// # Errors
///
/// Returns `TsError::TokenGeneration` if signing fails.
pub fn issue_server_token(config: &Config, room: Option<&RoomName>) -> Result<String, TsError> {
    AccessToken::new(&config.api_key, &config.api_secret)
        .with_ttl(SERVER_TOKEN_TTL)
        .with_grant(VideoGrant::room_service(room.map(RoomName::as_str)))
        .to_jwt()
        .map_err(|e| TsError::TokenGeneration(e.to_string()))
}
