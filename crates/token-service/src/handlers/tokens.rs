//! Token endpoint.
//!
//! - `POST /get-token` - mint a browser access token for a room
//!
//! # Security
//!
//! - Tokens are never logged
//! - Browser tokens never carry `roomAdmin`
//! - Only the first identity to ask for the creator role in a room gets it
//! - The response reports the role actually granted

use crate::errors::TsError;
use crate::models::{GetTokenRequest, TokenResponse};
use crate::routes::AppState;
use crate::services::token_issuer::{issue_participant_token, TokenRole};
use axum::{extract::State, Json};
use common::types::{ParticipantIdentity, RoomName};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Message returned when either name is missing or blank.
pub const MISSING_NAMES_MESSAGE: &str = "Missing room name or participant name";

/// Handler for POST /get-token
///
/// # Response
///
/// - 200 OK: `{token, url, isRoomCreator}`
/// - 400 Bad Request: room name or participant name missing
/// - 500 Internal Server Error: signing failed
#[instrument(
    skip_all,
    name = "ts.tokens.get_token",
    fields(method = "POST", endpoint = "/get-token")
)]
pub async fn get_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GetTokenRequest>,
) -> Result<Json<TokenResponse>, TsError> {
    let (room, identity) = match (
        RoomName::parse(&request.room_name),
        ParticipantIdentity::parse(&request.participant_name),
    ) {
        (Ok(room), Ok(identity)) => (room, identity),
        _ => return Err(TsError::BadRequest(MISSING_NAMES_MESSAGE.to_string())),
    };

    let room_sid = match state.room_backend.ensure_room(&room).await {
        Ok(info) => Some(info.sid).filter(|sid| !sid.is_empty()),
        Err(e) => {
            // The media server also creates rooms on first join.
            warn!(
                target: "ts.handlers.tokens",
                room = %room,
                error = %e,
                "Could not pre-create room"
            );
            None
        }
    };

    let role = if request.is_room_creator {
        if state
            .creators
            .claim(&room, room_sid.as_deref(), &identity)
            .await
        {
            TokenRole::Creator
        } else {
            warn!(
                target: "ts.handlers.tokens",
                room = %room,
                identity = %identity,
                "Room already has a creator, issuing participant token"
            );
            TokenRole::Participant
        }
    } else {
        TokenRole::Participant
    };

    let token = issue_participant_token(&state.config, &room, &identity, role)?;

    info!(
        target: "ts.handlers.tokens",
        room = %room,
        identity = %identity,
        role = role.as_str(),
        "Issued access token"
    );

    Ok(Json(TokenResponse {
        token,
        url: state.config.livekit_host.clone(),
        is_room_creator: role == TokenRole::Creator,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::{CreatorRegistry, InMemoryRoomBackend, RoomBackend};
    use common::jwt::verify_access_token;
    use std::collections::HashMap;

    fn test_state() -> Arc<AppState> {
        let config = Config::from_vars(&HashMap::from([
            ("LIVEKIT_API_KEY".to_string(), "APItest".to_string()),
            (
                "LIVEKIT_API_SECRET".to_string(),
                "test-secret-test-secret-test-sec".to_string(),
            ),
            (
                "LIVEKIT_HOST".to_string(),
                "wss://media.example.com".to_string(),
            ),
        ]))
        .unwrap();

        Arc::new(AppState {
            config,
            room_backend: Arc::new(InMemoryRoomBackend::new()),
            creators: Arc::new(CreatorRegistry::new()),
        })
    }

    fn request(room: &str, name: &str, creator: bool) -> Json<GetTokenRequest> {
        Json(GetTokenRequest {
            room_name: room.to_string(),
            participant_name: name.to_string(),
            is_room_creator: creator,
        })
    }

    #[tokio::test]
    async fn test_get_token_returns_url_and_verifiable_token() {
        let state = test_state();

        let Json(response) = get_token(State(state.clone()), request("standup", "alice", false))
            .await
            .unwrap();

        assert_eq!(response.url, "wss://media.example.com");
        let claims =
            verify_access_token(&response.token, "APItest", &state.config.api_secret).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.video.room.as_deref(), Some("standup"));
    }

    #[tokio::test]
    async fn test_get_token_rejects_blank_names() {
        let state = test_state();

        for (room, name) in [("", "alice"), ("standup", "   "), ("", "")] {
            let result = get_token(State(state.clone()), request(room, name, false)).await;
            assert!(
                matches!(&result, Err(TsError::BadRequest(msg)) if msg == MISSING_NAMES_MESSAGE),
                "room={room:?} name={name:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_get_token_creates_room() {
        let state = test_state();
        let room = RoomName::parse("standup").unwrap();

        get_token(State(state.clone()), request("standup", "alice", false))
            .await
            .unwrap();

        assert!(state.room_backend.get_room(&room).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_second_creator_is_downgraded() {
        let state = test_state();

        let Json(first) = get_token(State(state.clone()), request("standup", "alice", true))
            .await
            .unwrap();
        let Json(second) = get_token(State(state.clone()), request("standup", "bob", true))
            .await
            .unwrap();

        let secret = &state.config.api_secret;
        let first = verify_access_token(&first.token, "APItest", secret).unwrap();
        let second = verify_access_token(&second.token, "APItest", secret).unwrap();
        assert!(first.video.room_create);
        assert!(!second.video.room_create);
    }

    #[tokio::test]
    async fn test_response_reports_granted_role() {
        let state = test_state();

        let Json(first) = get_token(State(state.clone()), request("standup", "alice", true))
            .await
            .unwrap();
        let Json(second) = get_token(State(state.clone()), request("standup", "bob", true))
            .await
            .unwrap();
        let Json(plain) = get_token(State(state.clone()), request("standup", "carol", false))
            .await
            .unwrap();

        assert!(first.is_room_creator);
        assert!(!second.is_room_creator);
        assert!(!plain.is_room_creator);
    }

    #[tokio::test]
    async fn test_creator_of_vanished_room_is_replaced() {
        let state = test_state();
        let room = RoomName::parse("standup").unwrap();
        get_token(State(state.clone()), request("standup", "alice", true))
            .await
            .unwrap();

        // Media server drops the empty room; a fresh one appears on the next join.
        state.room_backend.delete_room(&room).await.unwrap();
        let Json(response) = get_token(State(state.clone()), request("standup", "bob", true))
            .await
            .unwrap();

        assert!(response.is_room_creator);
        let claims =
            verify_access_token(&response.token, "APItest", &state.config.api_secret).unwrap();
        assert!(claims.video.room_create);
        assert_eq!(
            state.creators.creator_of(&room).await,
            Some(ParticipantIdentity::parse("bob").unwrap())
        );
    }
}
