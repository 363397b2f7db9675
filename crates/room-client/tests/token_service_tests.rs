//! Client calls against a real token service instance.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use common::types::{ParticipantIdentity, RoomName};
use room_client::errors::ClientError;
use room_client::mock::{MemorySurface, MockRoomSession};
use room_client::{ClientConfig, Conference, TokenClient};
use token_service::services::RoomBackend;
use token_test_utils::{TestTokenServer, TEST_LIVEKIT_HOST};

fn client_for(server: &TestTokenServer) -> TokenClient {
    TokenClient::new(&ClientConfig::new(server.url())).unwrap()
}

fn room(name: &str) -> RoomName {
    RoomName::parse(name).unwrap()
}

fn who(name: &str) -> ParticipantIdentity {
    ParticipantIdentity::parse(name).unwrap()
}

#[tokio::test]
async fn test_token_round_trip() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = client_for(&server);

    let details = client
        .request_token(&room("standup"), &who("alice"), false)
        .await?;

    assert_eq!(details.url, TEST_LIVEKIT_HOST);
    let claims = server.verify_token(&details.token)?;
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.video.room.as_deref(), Some("standup"));
    assert!(claims.video.room_join);
    assert!(!claims.video.room_create);
    Ok(())
}

#[tokio::test]
async fn test_check_room_after_token_request() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = client_for(&server);

    assert!(!client.check_room(&room("standup")).await?);
    client
        .request_token(&room("standup"), &who("alice"), true)
        .await?;
    assert!(client.check_room(&room("standup")).await?);
    Ok(())
}

#[tokio::test]
async fn test_end_room_by_other_participant_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = client_for(&server);
    client
        .request_token(&room("standup"), &who("alice"), true)
        .await?;

    let err = client
        .end_room(&room("standup"), &who("bob"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::ServerError {
            status: 403,
            message: "Only the room creator can end the room".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_creator_join_and_end_room() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let mut conf = Conference::new(
        client_for(&server),
        MockRoomSession::new("alice"),
        MemorySurface::new(),
    );

    conf.join("standup", "alice").await;

    assert!(conf.flags().is_room_creator);
    let info = server.rooms().get_room(&room("standup")).await?.unwrap();
    let metadata: serde_json::Value = serde_json::from_str(&info.metadata)?;
    assert_eq!(metadata["creator"], "alice");

    conf.end_room().await;

    assert!(!conf.is_connected());
    assert!(server.rooms().get_room(&room("standup")).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_second_joiner_is_not_creator() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    server.seed_room("standup").await?;
    let mut conf = Conference::new(
        client_for(&server),
        MockRoomSession::new("bob"),
        MemorySurface::new(),
    );

    conf.join("standup", "bob").await;

    assert!(conf.is_connected());
    assert!(!conf.flags().is_room_creator);
    Ok(())
}

#[tokio::test]
async fn test_new_creator_after_room_vanishes() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let mut alice = Conference::new(
        client_for(&server),
        MockRoomSession::new("alice"),
        MemorySurface::new(),
    );
    alice.join("standup", "alice").await;
    assert!(alice.flags().is_room_creator);
    alice.leave().await;

    // The media server drops the room once it has been empty for a while.
    server.rooms().delete_room(&room("standup")).await?;

    let mut bob = Conference::new(
        client_for(&server),
        MockRoomSession::new("bob"),
        MemorySurface::new(),
    );
    bob.join("standup", "bob").await;

    assert!(bob.flags().is_room_creator);
    assert!(server.rooms().get_room(&room("standup")).await?.is_some());

    bob.end_room().await;

    assert!(!bob.is_connected());
    assert!(server.rooms().get_room(&room("standup")).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_granted_role_is_reported_to_client() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = client_for(&server);

    let first = client
        .request_token(&room("standup"), &who("alice"), true)
        .await?;
    let second = client
        .request_token(&room("standup"), &who("bob"), true)
        .await?;

    assert!(first.is_room_creator);
    assert!(!second.is_room_creator);
    assert!(!server.verify_token(&second.token)?.video.room_create);
    Ok(())
}
