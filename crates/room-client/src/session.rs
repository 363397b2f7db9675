//! The room session seam.
//!
//! `RoomSession` is the slice of the media SDK's room object the client
//! drives: connect, disconnect, local device control and participant
//! metadata. Events flow the other way, as `RoomEvent`s.

use crate::errors::SessionError;
use common::types::ParticipantIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Media input devices present on this machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceAvailability {
    pub has_camera: bool,
    pub has_microphone: bool,
}

#[async_trait::async_trait]
pub trait RoomSession: Send + Sync {
    async fn connect(&self, url: &str, token: &str) -> Result<(), SessionError>;

    async fn disconnect(&self) -> Result<(), SessionError>;

    fn connection_state(&self) -> ConnectionState;

    /// Identity the server assigned to the local participant, once connected.
    fn local_identity(&self) -> Option<ParticipantIdentity>;

    async fn available_devices(&self) -> Result<DeviceAvailability, SessionError>;

    async fn enable_camera_and_microphone(&self) -> Result<(), SessionError>;

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), SessionError>;

    async fn set_camera_enabled(&self, enabled: bool) -> Result<(), SessionError>;

    async fn set_screen_share_enabled(&self, enabled: bool) -> Result<(), SessionError>;

    /// Replace the local participant's metadata, broadcast to everyone.
    async fn set_metadata(&self, metadata: &str) -> Result<(), SessionError>;
}
