//! Process-local room backend.
//!
//! Rooms live in a map guarded by a Tokio `RwLock`. Used when
//! `ROOM_BACKEND=memory` and by the test harness.

use crate::errors::TsError;
use crate::models::RoomInfo;
use crate::services::room_backend::RoomBackend;
use common::types::RoomName;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryRoomBackend {
    rooms: RwLock<HashMap<String, RoomInfo>>,
}

impl InMemoryRoomBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms currently known.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[async_trait::async_trait]
impl RoomBackend for InMemoryRoomBackend {
    async fn get_room(&self, room: &RoomName) -> Result<Option<RoomInfo>, TsError> {
        Ok(self.rooms.read().await.get(room.as_str()).cloned())
    }

    async fn ensure_room(&self, room: &RoomName) -> Result<RoomInfo, TsError> {
        let mut rooms = self.rooms.write().await;
        let info = rooms
            .entry(room.as_str().to_string())
            .or_insert_with(|| RoomInfo {
                sid: format!("RM_{}", Uuid::new_v4().simple()),
                name: room.as_str().to_string(),
                metadata: String::new(),
                num_participants: 0,
                creation_time: chrono::Utc::now().timestamp(),
            });
        Ok(info.clone())
    }

    async fn update_room_metadata(
        &self,
        room: &RoomName,
        metadata: &str,
    ) -> Result<RoomInfo, TsError> {
        let mut rooms = self.rooms.write().await;
        let info = rooms
            .get_mut(room.as_str())
            .ok_or_else(|| TsError::NotFound("Room not found".to_string()))?;
        info.metadata = metadata.to_string();
        Ok(info.clone())
    }

    async fn delete_room(&self, room: &RoomName) -> Result<(), TsError> {
        self.rooms
            .write()
            .await
            .remove(room.as_str())
            .map(|_| ())
            .ok_or_else(|| TsError::NotFound("Room not found".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn room(name: &str) -> RoomName {
        RoomName::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_room_is_absent() {
        let backend = InMemoryRoomBackend::new();
        assert!(backend.get_room(&room("standup")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_room_is_idempotent() {
        let backend = InMemoryRoomBackend::new();

        let first = backend.ensure_room(&room("standup")).await.unwrap();
        let second = backend.ensure_room(&room("standup")).await.unwrap();

        assert_eq!(first.sid, second.sid);
        assert!(first.sid.starts_with("RM_"));
        assert_eq!(backend.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_metadata() {
        let backend = InMemoryRoomBackend::new();
        backend.ensure_room(&room("standup")).await.unwrap();

        let updated = backend
            .update_room_metadata(&room("standup"), r#"{"creator":"alice"}"#)
            .await
            .unwrap();

        assert_eq!(updated.metadata, r#"{"creator":"alice"}"#);
        let fetched = backend.get_room(&room("standup")).await.unwrap().unwrap();
        assert_eq!(fetched.metadata, updated.metadata);
    }

    #[tokio::test]
    async fn test_update_metadata_unknown_room() {
        let backend = InMemoryRoomBackend::new();
        let result = backend.update_room_metadata(&room("ghost"), "{}").await;
        assert!(matches!(result, Err(TsError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_room() {
        let backend = InMemoryRoomBackend::new();
        backend.ensure_room(&room("standup")).await.unwrap();

        backend.delete_room(&room("standup")).await.unwrap();

        assert!(backend.get_room(&room("standup")).await.unwrap().is_none());
        assert!(matches!(
            backend.delete_room(&room("standup")).await,
            Err(TsError::NotFound(_))
        ));
    }
}
