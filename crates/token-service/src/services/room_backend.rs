//! Room backend seam.
//!
//! The token service never stores rooms itself in production; it asks the
//! media server's room API. `RoomBackend` abstracts that API so handlers can
//! run against the in-memory backend in tests and local development.

use crate::errors::TsError;
use crate::models::RoomInfo;
use common::types::RoomName;

/// Room administration operations used by the HTTP handlers.
#[async_trait::async_trait]
pub trait RoomBackend: Send + Sync {
    /// Look a room up by name.
    async fn get_room(&self, room: &RoomName) -> Result<Option<RoomInfo>, TsError>;

    /// Create the room if it does not exist yet; returns the (existing or new) room.
    async fn ensure_room(&self, room: &RoomName) -> Result<RoomInfo, TsError>;

    /// Replace the room's metadata.
    ///
    /// Returns `TsError::NotFound` if the room does not exist.
    async fn update_room_metadata(
        &self,
        room: &RoomName,
        metadata: &str,
    ) -> Result<RoomInfo, TsError>;

    /// Delete the room, disconnecting every participant.
    ///
    /// Returns `TsError::NotFound` if the room does not exist.
    async fn delete_room(&self, room: &RoomName) -> Result<(), TsError>;
}
