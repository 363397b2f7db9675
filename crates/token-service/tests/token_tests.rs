//! `/get-token` integration tests.

use serde_json::{json, Value};
use token_test_utils::{TestTokenServer, TEST_API_KEY, TEST_LIVEKIT_HOST};

async fn get_token(server: &TestTokenServer, body: Value) -> reqwest::Result<reqwest::Response> {
    reqwest::Client::new()
        .post(format!("{}/get-token", server.url()))
        .json(&body)
        .send()
        .await
}

/// A minted token verifies and carries the requested room, identity and grants.
#[tokio::test]
async fn test_token_carries_room_identity_and_grants() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = get_token(
        &server,
        json!({"roomName": "standup", "participantName": "alice"}),
    )
    .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body["url"], TEST_LIVEKIT_HOST);
    assert_eq!(body["isRoomCreator"], false);
    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("token missing"))?;

    let claims = server.verify_token(token)?;
    assert_eq!(claims.iss, TEST_API_KEY);
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.exp - claims.iat, 24 * 3600);
    assert_eq!(claims.video.room.as_deref(), Some("standup"));
    assert!(claims.video.room_join);
    assert!(claims.video.can_publish);
    assert!(claims.video.can_subscribe);
    assert!(claims.video.can_publish_data);
    assert!(!claims.video.room_create);
    assert!(!claims.video.room_admin);

    Ok(())
}

/// The first creator request gets `roomCreate`; later ones do not.
#[tokio::test]
async fn test_creator_grant_goes_to_first_creator() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let first: Value = get_token(
        &server,
        json!({"roomName": "standup", "participantName": "alice", "isRoomCreator": true}),
    )
    .await?
    .json()
    .await?;
    let second: Value = get_token(
        &server,
        json!({"roomName": "standup", "participantName": "bob", "isRoomCreator": true}),
    )
    .await?
    .json()
    .await?;

    assert_eq!(first["isRoomCreator"], true);
    assert_eq!(second["isRoomCreator"], false);

    let first = server.verify_token(first["token"].as_str().unwrap_or_default())?;
    let second = server.verify_token(second["token"].as_str().unwrap_or_default())?;
    assert!(first.video.room_create);
    assert!(first.video.room_list);
    assert!(!second.video.room_create);

    Ok(())
}

/// A blank participant name is rejected with the server's message.
#[tokio::test]
async fn test_blank_participant_name_returns_400() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = get_token(
        &server,
        json!({"roomName": "standup", "participantName": "  "}),
    )
    .await?;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Missing room name or participant name");

    Ok(())
}

/// A body without `roomName` is rejected the same way.
#[tokio::test]
async fn test_missing_room_name_returns_400() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = get_token(&server, json!({"participantName": "alice"})).await?;

    assert_eq!(response.status(), 400);

    Ok(())
}

/// Issuing a token makes the room visible to `/check-room`.
#[tokio::test]
async fn test_token_request_creates_room() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    get_token(
        &server,
        json!({"roomName": "standup", "participantName": "alice"}),
    )
    .await?;

    assert_eq!(server.rooms().room_count().await, 1);

    Ok(())
}
