//! View adapter.
//!
//! Keeps the surface in step with the room: one tile per connected
//! participant, one rendering element per subscribed track, and the mute
//! badge and video placeholder reflecting the latest mute signals.
//!
//! Every method runs synchronously inside one event callback. Surface
//! operations that fail (track attach) are logged and never abort the event.

use crate::events::{MuteScope, ParticipantInfo, PublicationInfo, TrackHandle, TrackKind};
use crate::view::{self, GridLayout, Notification, TileSpec, ViewSurface};
use common::types::ParticipantIdentity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Participant mute state broadcast through participant metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteMetadata {
    pub muted: bool,
    /// Milliseconds since the Unix epoch.
    pub last_update: i64,
}

impl MuteMetadata {
    pub fn now(muted: bool) -> Self {
        Self {
            muted,
            last_update: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Parse a metadata blob. Returns `None` for anything that is not a
    /// mute metadata object.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({ "muted": self.muted, "lastUpdate": self.last_update }).to_string()
    }
}

/// What the adapter knows about one participant tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub identity: ParticipantIdentity,
    pub is_local: bool,
    pub camera_enabled: bool,
    pub mic_muted: bool,
    pub has_video_element: bool,
    pub placeholder_visible: bool,
    /// `lastUpdate` of the last metadata blob applied to this participant.
    pub last_metadata_update: Option<i64>,
}

impl ParticipantView {
    fn new(identity: ParticipantIdentity, is_local: bool) -> Self {
        Self {
            identity,
            is_local,
            camera_enabled: false,
            mic_muted: false,
            has_video_element: true,
            placeholder_visible: true,
            last_metadata_update: None,
        }
    }
}

/// A track bound to a rendering element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackAttachment {
    pub track_sid: String,
    pub participant: ParticipantIdentity,
    pub kind: TrackKind,
    pub element_id: String,
}

#[derive(Debug, Default)]
pub struct ViewAdapter {
    local_identity: Option<ParticipantIdentity>,
    participants: BTreeMap<ParticipantIdentity, ParticipantView>,
    attachments: HashMap<String, TrackAttachment>,
}

impl ViewAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of the local participant, once its tile is mounted.
    pub fn local_identity(&self) -> Option<&ParticipantIdentity> {
        self.local_identity.as_ref()
    }

    pub fn tile_count(&self) -> usize {
        self.participants.len()
    }

    pub fn participant(&self, identity: &ParticipantIdentity) -> Option<&ParticipantView> {
        self.participants.get(identity)
    }

    /// Identities with a tile, in sorted order.
    pub fn identities(&self) -> Vec<ParticipantIdentity> {
        self.participants.keys().cloned().collect()
    }

    pub fn is_attached(&self, track_sid: &str) -> bool {
        self.attachments.contains_key(track_sid)
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// Mount the local participant's tile.
    pub fn mount_local(&mut self, surface: &mut dyn ViewSurface, identity: &ParticipantIdentity) {
        self.local_identity = Some(identity.clone());
        self.ensure_tile(surface, identity, true);
    }

    fn is_local(&self, identity: &ParticipantIdentity) -> bool {
        self.local_identity.as_ref() == Some(identity)
    }

    fn ensure_tile(
        &mut self,
        surface: &mut dyn ViewSurface,
        identity: &ParticipantIdentity,
        is_local: bool,
    ) {
        if self.participants.contains_key(identity) {
            return;
        }

        surface.create_tile(&TileSpec::for_participant(identity, is_local));
        surface.set_placeholder_visible(identity, true);
        surface.set_mute_badge_visible(identity, false);
        self.participants
            .insert(identity.clone(), ParticipantView::new(identity.clone(), is_local));

        debug!(target: "room_client.adapter", participant = %identity, is_local, "Created participant tile");
        self.update_layout(surface);
    }

    fn update_layout(&self, surface: &mut dyn ViewSurface) {
        surface.set_grid_layout(GridLayout::for_tile_count(self.participants.len()));
    }

    /// The session connected; `participants` were already in the room.
    pub fn on_connected(&mut self, surface: &mut dyn ViewSurface, participants: &[ParticipantInfo]) {
        for participant in participants {
            if self.is_local(&participant.identity) {
                continue;
            }
            self.on_participant_connected(surface, participant);
        }
    }

    pub fn on_participant_connected(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantInfo,
    ) {
        let identity = &participant.identity;
        self.ensure_tile(surface, identity, false);

        for publication in &participant.publications {
            if let Some(track) = &publication.track {
                self.on_track_subscribed(surface, identity, publication, track);
            }
        }

        if let Some(metadata) = &participant.metadata {
            self.on_metadata_changed(surface, identity, metadata);
        }

        surface.notify(Notification::success(format!("{} joined the room", identity)));
    }

    /// A remote publication appeared. Only acted on once it carries a track.
    pub fn on_track_published(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        publication: &PublicationInfo,
    ) {
        if self.is_local(participant) {
            return;
        }
        if let Some(track) = &publication.track {
            self.on_track_subscribed(surface, participant, publication, track);
        }
    }

    pub fn on_track_subscribed(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        publication: &PublicationInfo,
        track: &TrackHandle,
    ) {
        if self.attachments.contains_key(&track.sid) {
            debug!(target: "room_client.adapter", track = %track.sid, "Track already attached");
            return;
        }

        let is_local = self.is_local(participant);
        self.ensure_tile(surface, participant, is_local);

        match track.kind {
            TrackKind::Video => self.attach_video(surface, participant, track),
            TrackKind::Audio => {
                self.attach_audio(surface, participant, track);
                self.set_mic_muted(surface, participant, publication.is_muted || track.is_muted);
            }
        }
    }

    fn attach_video(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        track: &TrackHandle,
    ) {
        let element_id = view::video_id(participant);
        if !surface.has_element(&element_id) {
            surface.create_video_element(participant);
        }

        let attached = match surface.attach_track(&element_id, track) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    target: "room_client.adapter",
                    participant = %participant,
                    track = %track.sid,
                    error = %e,
                    "Failed to attach video track"
                );
                false
            }
        };

        if let Some(view) = self.participants.get_mut(participant) {
            view.has_video_element = true;
        }
        if attached {
            self.record_attachment(participant, track, element_id);
        }
        self.set_camera_enabled(surface, participant, attached && !track.is_muted);
    }

    fn attach_audio(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        track: &TrackHandle,
    ) {
        let element_id = view::audio_id(participant);
        if !surface.has_element(&element_id) {
            surface.create_audio_element(participant);
        }

        match surface.attach_track(&element_id, track) {
            Ok(()) => self.record_attachment(participant, track, element_id),
            Err(e) => warn!(
                target: "room_client.adapter",
                participant = %participant,
                track = %track.sid,
                error = %e,
                "Failed to attach audio track"
            ),
        }
    }

    fn record_attachment(
        &mut self,
        participant: &ParticipantIdentity,
        track: &TrackHandle,
        element_id: String,
    ) {
        self.attachments.insert(
            track.sid.clone(),
            TrackAttachment {
                track_sid: track.sid.clone(),
                participant: participant.clone(),
                kind: track.kind,
                element_id,
            },
        );
    }

    pub fn on_track_unsubscribed(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        track: &TrackHandle,
    ) {
        let element_id = match self.attachments.remove(&track.sid) {
            Some(attachment) => attachment.element_id,
            None => match track.kind {
                TrackKind::Video => view::video_id(participant),
                TrackKind::Audio => view::audio_id(participant),
            },
        };

        surface.detach_track(&element_id, track);

        // Camera and screen share (or mic and screen audio) share one element.
        let sibling_attached = self
            .attachments
            .values()
            .any(|a| &a.participant == participant && a.kind == track.kind);
        if sibling_attached {
            debug!(
                target: "room_client.adapter",
                participant = %participant,
                track = %track.sid,
                "Track detached, element still in use"
            );
            return;
        }

        match track.kind {
            TrackKind::Audio => surface.remove_element(&element_id),
            TrackKind::Video => self.set_camera_enabled(surface, participant, false),
        }
    }

    /// The local camera track was published.
    pub fn on_local_track_published(
        &mut self,
        surface: &mut dyn ViewSurface,
        publication: &PublicationInfo,
    ) {
        let (Some(local), Some(track)) = (self.local_identity.clone(), publication.track.as_ref())
        else {
            return;
        };
        if track.kind != TrackKind::Video {
            return;
        }

        let element_id = view::video_id(&local);
        if !surface.has_element(&element_id) {
            return;
        }

        match surface.attach_track(&element_id, track) {
            Ok(()) => {
                self.record_attachment(&local, track, element_id);
                self.set_camera_enabled(surface, &local, !track.is_muted);
            }
            Err(e) => warn!(
                target: "room_client.adapter",
                track = %track.sid,
                error = %e,
                "Failed to attach local video track"
            ),
        }
    }

    /// A track or publication mute signal.
    pub fn on_mute_signal(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        kind: TrackKind,
        scope: MuteScope,
        muted: bool,
    ) {
        debug!(
            target: "room_client.adapter",
            participant = %participant,
            ?kind,
            ?scope,
            muted,
            "Mute signal"
        );

        match kind {
            TrackKind::Audio => self.set_mic_muted(surface, participant, muted),
            TrackKind::Video => self.set_camera_enabled(surface, participant, !muted),
        }
    }

    /// Apply a participant metadata blob.
    ///
    /// Blobs that are not mute metadata, and blobs older than the last one
    /// applied to the participant, are ignored.
    pub fn on_metadata_changed(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        metadata: &str,
    ) {
        let Some(update) = MuteMetadata::parse(metadata) else {
            debug!(target: "room_client.adapter", participant = %participant, "Ignoring unparseable metadata");
            return;
        };

        let Some(view) = self.participants.get_mut(participant) else {
            debug!(target: "room_client.adapter", participant = %participant, "Metadata for unknown participant");
            return;
        };

        if view
            .last_metadata_update
            .is_some_and(|last| update.last_update < last)
        {
            debug!(
                target: "room_client.adapter",
                participant = %participant,
                last_update = update.last_update,
                "Ignoring stale metadata"
            );
            return;
        }

        view.last_metadata_update = Some(update.last_update);
        self.set_mic_muted(surface, participant, update.muted);
    }

    pub fn on_participant_disconnected(
        &mut self,
        surface: &mut dyn ViewSurface,
        identity: &ParticipantIdentity,
    ) {
        if self.participants.remove(identity).is_some() {
            surface.remove_element(&view::tile_id(identity));
            surface.remove_element(&view::mute_badge_id(identity));
            surface.remove_element(&view::audio_id(identity));
            self.attachments
                .retain(|_, attachment| &attachment.participant != identity);
            self.update_layout(surface);
        }

        surface.notify(Notification::warning(format!("{} left the room", identity)));
    }

    pub fn set_mic_muted(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        muted: bool,
    ) {
        if let Some(view) = self.participants.get_mut(participant) {
            view.mic_muted = muted;
            surface.set_mute_badge_visible(participant, muted);
        }
    }

    pub fn set_camera_enabled(
        &mut self,
        surface: &mut dyn ViewSurface,
        participant: &ParticipantIdentity,
        enabled: bool,
    ) {
        if let Some(view) = self.participants.get_mut(participant) {
            view.camera_enabled = enabled;
            view.placeholder_visible = !enabled;
            surface.set_placeholder_visible(participant, !enabled);
        }
    }

    /// Remove every tile and audio element and forget all state.
    pub fn clear(&mut self, surface: &mut dyn ViewSurface) {
        for identity in self.participants.keys() {
            surface.remove_element(&view::audio_id(identity));
        }
        surface.clear_participants();
        surface.set_grid_layout(GridLayout::Single);

        self.participants.clear();
        self.attachments.clear();
        self.local_identity = None;
    }
}
