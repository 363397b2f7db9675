//! Room creator bookkeeping.
//!
//! The first participant that requests a creator token for a room becomes its
//! creator. Later creator requests from other identities are downgraded to
//! ordinary participants, and only the recorded creator may end the room.
//!
//! A claim is tied to the room instance (its `sid`) it was made against. If
//! the media server drops an empty room and a new one with the same name
//! appears, the old record no longer applies and the next claim replaces it.

use common::types::{ParticipantIdentity, RoomName};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CreatorRecord {
    identity: ParticipantIdentity,
    room_sid: Option<String>,
}

#[derive(Default)]
pub struct CreatorRegistry {
    creators: RwLock<HashMap<String, CreatorRecord>>,
}

impl CreatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the creator role for `identity` in the room instance `room_sid`.
    ///
    /// Returns `true` if the room had no creator, the recorded claim belongs
    /// to a different room instance, or `identity` already is the creator.
    /// Without a `room_sid` an existing claim is always honoured.
    pub async fn claim(
        &self,
        room: &RoomName,
        room_sid: Option<&str>,
        identity: &ParticipantIdentity,
    ) -> bool {
        let mut creators = self.creators.write().await;
        match creators.entry(room.as_str().to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(CreatorRecord {
                    identity: identity.clone(),
                    room_sid: room_sid.map(str::to_string),
                });
                true
            }
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                match (record.room_sid.as_deref(), room_sid) {
                    (Some(recorded), Some(current)) if recorded != current => {
                        *record = CreatorRecord {
                            identity: identity.clone(),
                            room_sid: Some(current.to_string()),
                        };
                        true
                    }
                    (None, Some(current)) if record.identity == *identity => {
                        record.room_sid = Some(current.to_string());
                        true
                    }
                    _ => record.identity == *identity,
                }
            }
        }
    }

    /// Recorded creator of `room`, if any.
    pub async fn creator_of(&self, room: &RoomName) -> Option<ParticipantIdentity> {
        self.creators
            .read()
            .await
            .get(room.as_str())
            .map(|record| record.identity.clone())
    }

    /// Forget the creator of an ended or vanished room.
    pub async fn forget(&self, room: &RoomName) {
        self.creators.write().await.remove(room.as_str());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn room() -> RoomName {
        RoomName::parse("standup").unwrap()
    }

    fn who(name: &str) -> ParticipantIdentity {
        ParticipantIdentity::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_first_claim_wins() {
        let registry = CreatorRegistry::new();

        assert!(registry.claim(&room(), Some("RM_1"), &who("alice")).await);
        assert!(!registry.claim(&room(), Some("RM_1"), &who("bob")).await);
        assert_eq!(registry.creator_of(&room()).await, Some(who("alice")));
    }

    #[tokio::test]
    async fn test_reclaim_by_same_identity() {
        let registry = CreatorRegistry::new();

        assert!(registry.claim(&room(), Some("RM_1"), &who("alice")).await);
        assert!(registry.claim(&room(), Some("RM_1"), &who("alice")).await);
    }

    #[tokio::test]
    async fn test_forget_releases_room() {
        let registry = CreatorRegistry::new();
        registry.claim(&room(), Some("RM_1"), &who("alice")).await;

        registry.forget(&room()).await;

        assert_eq!(registry.creator_of(&room()).await, None);
        assert!(registry.claim(&room(), Some("RM_1"), &who("bob")).await);
    }

    #[tokio::test]
    async fn test_claim_on_new_room_instance_replaces_old_creator() {
        let registry = CreatorRegistry::new();
        registry.claim(&room(), Some("RM_1"), &who("alice")).await;

        assert!(registry.claim(&room(), Some("RM_2"), &who("bob")).await);
        assert_eq!(registry.creator_of(&room()).await, Some(who("bob")));
        assert!(!registry.claim(&room(), Some("RM_2"), &who("alice")).await);
    }

    #[tokio::test]
    async fn test_claim_without_sid_keeps_existing_creator() {
        let registry = CreatorRegistry::new();
        registry.claim(&room(), Some("RM_1"), &who("alice")).await;

        assert!(!registry.claim(&room(), None, &who("bob")).await);
        assert_eq!(registry.creator_of(&room()).await, Some(who("alice")));
    }

    #[tokio::test]
    async fn test_sidless_claim_adopts_sid_for_same_creator() {
        let registry = CreatorRegistry::new();
        registry.claim(&room(), None, &who("alice")).await;

        assert!(registry.claim(&room(), Some("RM_1"), &who("alice")).await);
        assert!(!registry.claim(&room(), Some("RM_1"), &who("bob")).await);
    }
}
