//! The rendering surface.
//!
//! `ViewSurface` stands in for the DOM. Elements are addressed by string ids
//! derived from the participant identity, so a browser binding can map each
//! call onto `getElementById` and friends.

use crate::errors::AttachError;
use crate::events::TrackHandle;
use common::types::ParticipantIdentity;
use std::time::Duration;

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

pub fn tile_id(identity: &ParticipantIdentity) -> String {
    format!("participant-{}", identity)
}

pub fn video_id(identity: &ParticipantIdentity) -> String {
    format!("video-{}", identity)
}

pub fn audio_id(identity: &ParticipantIdentity) -> String {
    format!("audio-{}", identity)
}

pub fn mute_badge_id(identity: &ParticipantIdentity) -> String {
    format!("mute-{}", identity)
}

/// Everything needed to render a new participant tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSpec {
    pub identity: ParticipantIdentity,
    pub tile_id: String,
    pub video_id: String,
    pub mute_badge_id: String,
    /// Upper-cased first character of the identity.
    pub placeholder_text: String,
    pub name_label: String,
    pub is_local: bool,
}

impl TileSpec {
    pub fn for_participant(identity: &ParticipantIdentity, is_local: bool) -> Self {
        Self {
            identity: identity.clone(),
            tile_id: tile_id(identity),
            video_id: video_id(identity),
            mute_badge_id: mute_badge_id(identity),
            placeholder_text: identity.initial(),
            name_label: identity.to_string(),
            is_local,
        }
    }
}

/// Grid class applied to the participant area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLayout {
    Single,
    Pair,
    Quad,
    Nine,
    Many,
}

impl GridLayout {
    pub fn for_tile_count(count: usize) -> Self {
        match count {
            0 | 1 => GridLayout::Single,
            2 => GridLayout::Pair,
            3 | 4 => GridLayout::Quad,
            5..=9 => GridLayout::Nine,
            _ => GridLayout::Many,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            GridLayout::Single => "grid-1",
            GridLayout::Pair => "grid-2",
            GridLayout::Quad => "grid-4",
            GridLayout::Nine => "grid-9",
            GridLayout::Many => "grid-many",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// A transient, auto-dismissed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Call controls shown while in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Control {
    Mute,
    Video,
    ScreenShare,
    Leave,
    /// Shown to the room creator only.
    EndRoom,
}

impl Control {
    /// Controls disabled whenever no call is in progress.
    pub const PER_CALL: [Control; 5] = [
        Control::Mute,
        Control::Video,
        Control::ScreenShare,
        Control::Leave,
        Control::EndRoom,
    ];
}

/// Side-effecting view operations.
///
/// Implementations must tolerate ids that do not exist: removing or
/// updating a missing element is a no-op.
pub trait ViewSurface {
    /// Append a participant tile (video element, placeholder, name label and
    /// hidden mute badge) to the participant area.
    fn create_tile(&mut self, tile: &TileSpec);

    fn has_element(&self, id: &str) -> bool;

    fn remove_element(&mut self, id: &str);

    /// Add a video element to an existing tile.
    fn create_video_element(&mut self, identity: &ParticipantIdentity);

    /// Append a hidden audio element to the document body.
    fn create_audio_element(&mut self, identity: &ParticipantIdentity);

    fn attach_track(&mut self, element_id: &str, track: &TrackHandle) -> Result<(), AttachError>;

    fn detach_track(&mut self, element_id: &str, track: &TrackHandle);

    fn set_placeholder_visible(&mut self, identity: &ParticipantIdentity, visible: bool);

    fn set_mute_badge_visible(&mut self, identity: &ParticipantIdentity, visible: bool);

    fn set_grid_layout(&mut self, layout: GridLayout);

    /// Remove every tile from the participant area.
    fn clear_participants(&mut self);

    fn notify(&mut self, notification: Notification);

    fn set_control_label(&mut self, control: Control, label: &str);

    fn set_control_enabled(&mut self, control: Control, enabled: bool);

    fn set_control_visible(&mut self, control: Control, visible: bool);

    /// Switch between the lobby form and the call view.
    fn show_lobby(&mut self, visible: bool);
}
