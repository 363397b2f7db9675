//! Room endpoints.
//!
//! - `POST /check-room` - does the room exist yet
//! - `POST /set-room-metadata` - replace the room's metadata blob
//! - `POST /end-room` - delete the room, disconnecting everyone
//!
//! # Security
//!
//! Only the recorded room creator may end a room. Rooms whose creator is not
//! known to this process (for example after a restart) can be ended by any
//! caller that names a participant. A room the backend reports as absent has
//! no creator.

use crate::errors::TsError;
use crate::models::{
    CheckRoomRequest, CheckRoomResponse, EndRoomRequest, SetRoomMetadataRequest, SuccessResponse,
};
use crate::routes::AppState;
use axum::{extract::State, Json};
use common::types::{ParticipantIdentity, RoomName};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const MISSING_ROOM_MESSAGE: &str = "Missing room name";
pub const MISSING_END_ROOM_FIELDS_MESSAGE: &str = "Missing room name or participant ID";
pub const NOT_CREATOR_MESSAGE: &str = "Only the room creator can end the room";

fn parse_room(raw: &str) -> Result<RoomName, TsError> {
    RoomName::parse(raw).map_err(|_| TsError::BadRequest(MISSING_ROOM_MESSAGE.to_string()))
}

/// Handler for POST /check-room
///
/// # Response
///
/// - 200 OK: `{exists}`
/// - 400 Bad Request: room name missing
/// - 502 Bad Gateway: room backend unavailable
#[instrument(
    skip_all,
    name = "ts.rooms.check_room",
    fields(method = "POST", endpoint = "/check-room")
)]
pub async fn check_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckRoomRequest>,
) -> Result<Json<CheckRoomResponse>, TsError> {
    let room = parse_room(&request.room_name)?;
    let exists = state.room_backend.get_room(&room).await?.is_some();

    if !exists {
        state.creators.forget(&room).await;
    }

    Ok(Json(CheckRoomResponse { exists }))
}

/// Handler for POST /set-room-metadata
///
/// # Response
///
/// - 200 OK: `{success: true}`
/// - 400 Bad Request: room name missing
/// - 404 Not Found: room does not exist
/// - 502 Bad Gateway: room backend unavailable
#[instrument(
    skip_all,
    name = "ts.rooms.set_metadata",
    fields(method = "POST", endpoint = "/set-room-metadata")
)]
pub async fn set_room_metadata(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetRoomMetadataRequest>,
) -> Result<Json<SuccessResponse>, TsError> {
    let room = parse_room(&request.room_name)?;
    let metadata = request.metadata_string();

    state
        .room_backend
        .update_room_metadata(&room, &metadata)
        .await?;

    info!(
        target: "ts.handlers.rooms",
        room = %room,
        metadata_len = metadata.len(),
        "Room metadata updated"
    );

    Ok(Json(SuccessResponse::ok()))
}

/// Handler for POST /end-room
///
/// # Response
///
/// - 200 OK: `{success: true}`
/// - 400 Bad Request: room name or participant ID missing
/// - 403 Forbidden: caller is not the room creator
/// - 404 Not Found: room does not exist
/// - 502 Bad Gateway: room backend unavailable
#[instrument(
    skip_all,
    name = "ts.rooms.end_room",
    fields(method = "POST", endpoint = "/end-room")
)]
pub async fn end_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EndRoomRequest>,
) -> Result<Json<SuccessResponse>, TsError> {
    let (room, caller) = match (
        RoomName::parse(&request.room_name),
        ParticipantIdentity::parse(&request.participant_id),
    ) {
        (Ok(room), Ok(caller)) => (room, caller),
        _ => {
            return Err(TsError::BadRequest(
                MISSING_END_ROOM_FIELDS_MESSAGE.to_string(),
            ))
        }
    };

    if let Some(creator) = state.creators.creator_of(&room).await {
        if creator != caller {
            warn!(
                target: "ts.handlers.rooms",
                room = %room,
                caller = %caller,
                "Non-creator attempted to end room"
            );
            return Err(TsError::Forbidden(NOT_CREATOR_MESSAGE.to_string()));
        }
    }

    state.room_backend.delete_room(&room).await?;
    state.creators.forget(&room).await;

    info!(
        target: "ts.handlers.rooms",
        room = %room,
        caller = %caller,
        "Room ended"
    );

    Ok(Json(SuccessResponse::ok()))
}
