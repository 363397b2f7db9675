//! Local call controls and their flags.

use crate::view::Control;

/// Per-call local state. Reset to the default when the call ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub is_muted: bool,
    pub is_video_off: bool,
    pub is_screen_sharing: bool,
    pub is_room_creator: bool,
}

impl SessionFlags {
    /// Whether `control` is in its active state (muted, video off, sharing).
    pub fn get(&self, control: LocalControl) -> bool {
        match control {
            LocalControl::Microphone => self.is_muted,
            LocalControl::Camera => self.is_video_off,
            LocalControl::ScreenShare => self.is_screen_sharing,
        }
    }

    pub fn set(&mut self, control: LocalControl, active: bool) {
        match control {
            LocalControl::Microphone => self.is_muted = active,
            LocalControl::Camera => self.is_video_off = active,
            LocalControl::ScreenShare => self.is_screen_sharing = active,
        }
    }
}

/// A toggleable local capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalControl {
    Microphone,
    Camera,
    ScreenShare,
}

impl LocalControl {
    pub const ALL: [LocalControl; 3] = [
        LocalControl::Microphone,
        LocalControl::Camera,
        LocalControl::ScreenShare,
    ];

    /// The button bound to this capability.
    pub fn control(&self) -> Control {
        match self {
            LocalControl::Microphone => Control::Mute,
            LocalControl::Camera => Control::Video,
            LocalControl::ScreenShare => Control::ScreenShare,
        }
    }

    /// Button label while the flag is `active`.
    pub fn label(&self, active: bool) -> &'static str {
        match (self, active) {
            (LocalControl::Microphone, true) => "Unmute",
            (LocalControl::Microphone, false) => "Mute",
            (LocalControl::Camera, true) => "Start Video",
            (LocalControl::Camera, false) => "Stop Video",
            (LocalControl::ScreenShare, true) => "Stop Sharing",
            (LocalControl::ScreenShare, false) => "Share Screen",
        }
    }

    /// Name used in "Failed to toggle {name}" messages.
    pub fn name(&self) -> &'static str {
        match self {
            LocalControl::Microphone => "mute",
            LocalControl::Camera => "video",
            LocalControl::ScreenShare => "screen share",
        }
    }

    pub fn success_message(&self, active: bool) -> &'static str {
        match (self, active) {
            (LocalControl::Microphone, true) => "Microphone muted",
            (LocalControl::Microphone, false) => "Microphone unmuted",
            (LocalControl::Camera, true) => "Camera disabled",
            (LocalControl::Camera, false) => "Camera enabled",
            (LocalControl::ScreenShare, true) => "Screen sharing started",
            (LocalControl::ScreenShare, false) => "Screen sharing stopped",
        }
    }
}
