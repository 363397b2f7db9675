//! Room session events as delivered by the media SDK.
//!
//! The SDK calls back serially; every callback is translated into one
//! `RoomEvent` and handed to `Conference::handle_event`.

use common::types::ParticipantIdentity;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// Where a mute signal originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteScope {
    /// The media track itself was muted or unmuted.
    Track,
    /// The publisher toggled the publication.
    Publication,
}

/// A subscribed (or local) media track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackHandle {
    pub sid: String,
    pub kind: TrackKind,
    pub is_muted: bool,
}

impl TrackHandle {
    pub fn new(sid: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            sid: sid.into(),
            kind,
            is_muted: false,
        }
    }

    #[must_use]
    pub fn muted(mut self, is_muted: bool) -> Self {
        self.is_muted = is_muted;
        self
    }
}

/// A published track; `track` is set once the local side holds the media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationInfo {
    pub sid: String,
    pub kind: TrackKind,
    pub is_muted: bool,
    pub track: Option<TrackHandle>,
}

impl PublicationInfo {
    /// A publication carrying `track`, sharing its sid, kind and mute state.
    pub fn with_track(track: TrackHandle) -> Self {
        Self {
            sid: track.sid.clone(),
            kind: track.kind,
            is_muted: track.is_muted,
            track: Some(track),
        }
    }

    /// A publication not yet subscribed locally.
    pub fn pending(sid: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            sid: sid.into(),
            kind,
            is_muted: false,
            track: None,
        }
    }
}

/// Snapshot of a remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantInfo {
    pub identity: ParticipantIdentity,
    pub metadata: Option<String>,
    pub publications: Vec<PublicationInfo>,
}

impl ParticipantInfo {
    pub fn new(identity: impl Into<ParticipantIdentity>) -> Self {
        Self {
            identity: identity.into(),
            metadata: None,
            publications: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_publication(mut self, publication: PublicationInfo) -> Self {
        self.publications.push(publication);
        self
    }
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    ClientInitiated,
    ServerShutdown,
    RoomDeleted,
    ParticipantRemoved,
    ConnectionLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// The session joined; `participants` are the remote participants
    /// already in the room.
    Connected {
        participants: Vec<ParticipantInfo>,
    },
    Disconnected {
        reason: DisconnectReason,
    },
    ParticipantConnected(ParticipantInfo),
    ParticipantDisconnected {
        identity: ParticipantIdentity,
    },
    TrackPublished {
        participant: ParticipantIdentity,
        publication: PublicationInfo,
    },
    TrackSubscribed {
        participant: ParticipantIdentity,
        publication: PublicationInfo,
        track: TrackHandle,
    },
    TrackUnsubscribed {
        participant: ParticipantIdentity,
        track: TrackHandle,
    },
    TrackMuted {
        participant: ParticipantIdentity,
        kind: TrackKind,
        scope: MuteScope,
    },
    TrackUnmuted {
        participant: ParticipantIdentity,
        kind: TrackKind,
        scope: MuteScope,
    },
    ParticipantMetadataChanged {
        participant: ParticipantIdentity,
        metadata: String,
    },
    LocalTrackPublished {
        publication: PublicationInfo,
    },
}

/// Discriminant of `RoomEvent`, used as the dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    ParticipantConnected,
    ParticipantDisconnected,
    TrackPublished,
    TrackSubscribed,
    TrackUnsubscribed,
    TrackMuted,
    TrackUnmuted,
    ParticipantMetadataChanged,
    LocalTrackPublished,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Disconnected => "disconnected",
            EventKind::ParticipantConnected => "participant_connected",
            EventKind::ParticipantDisconnected => "participant_disconnected",
            EventKind::TrackPublished => "track_published",
            EventKind::TrackSubscribed => "track_subscribed",
            EventKind::TrackUnsubscribed => "track_unsubscribed",
            EventKind::TrackMuted => "track_muted",
            EventKind::TrackUnmuted => "track_unmuted",
            EventKind::ParticipantMetadataChanged => "participant_metadata_changed",
            EventKind::LocalTrackPublished => "local_track_published",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RoomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RoomEvent::Connected { .. } => EventKind::Connected,
            RoomEvent::Disconnected { .. } => EventKind::Disconnected,
            RoomEvent::ParticipantConnected(_) => EventKind::ParticipantConnected,
            RoomEvent::ParticipantDisconnected { .. } => EventKind::ParticipantDisconnected,
            RoomEvent::TrackPublished { .. } => EventKind::TrackPublished,
            RoomEvent::TrackSubscribed { .. } => EventKind::TrackSubscribed,
            RoomEvent::TrackUnsubscribed { .. } => EventKind::TrackUnsubscribed,
            RoomEvent::TrackMuted { .. } => EventKind::TrackMuted,
            RoomEvent::TrackUnmuted { .. } => EventKind::TrackUnmuted,
            RoomEvent::ParticipantMetadataChanged { .. } => EventKind::ParticipantMetadataChanged,
            RoomEvent::LocalTrackPublished { .. } => EventKind::LocalTrackPublished,
        }
    }
}
