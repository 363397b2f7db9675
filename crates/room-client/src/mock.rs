//! In-memory surface and scripted room session for tests and headless hosts.

use crate::errors::{AttachError, SessionError};
use crate::events::TrackHandle;
use crate::session::{ConnectionState, DeviceAvailability, RoomSession};
use crate::view::{self, Control, GridLayout, Notification, TileSpec, ViewSurface};
use common::types::ParticipantIdentity;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A rendered participant tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileState {
    pub spec: TileSpec,
    pub placeholder_visible: bool,
    pub mute_badge_visible: bool,
}

/// A `ViewSurface` that records everything in memory.
///
/// Starts in the lobby with every control disabled and the end-room
/// control hidden.
#[derive(Debug)]
pub struct MemorySurface {
    tiles: BTreeMap<String, TileState>,
    video_elements: HashSet<String>,
    audio_elements: HashSet<String>,
    attached: HashMap<String, Vec<String>>,
    grid: GridLayout,
    notifications: Vec<Notification>,
    labels: HashMap<Control, String>,
    enabled: HashMap<Control, bool>,
    visible: HashMap<Control, bool>,
    lobby_visible: bool,
    failing_tracks: HashSet<String>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self {
            tiles: BTreeMap::new(),
            video_elements: HashSet::new(),
            audio_elements: HashSet::new(),
            attached: HashMap::new(),
            grid: GridLayout::Single,
            notifications: Vec::new(),
            labels: HashMap::new(),
            enabled: HashMap::new(),
            visible: HashMap::new(),
            lobby_visible: true,
            failing_tracks: HashSet::new(),
        }
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later attach of `track_sid` fail.
    pub fn fail_attach(&mut self, track_sid: impl Into<String>) {
        self.failing_tracks.insert(track_sid.into());
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn has_tile(&self, identity: &ParticipantIdentity) -> bool {
        self.tiles.contains_key(identity.as_str())
    }

    pub fn tile(&self, identity: &ParticipantIdentity) -> Option<&TileState> {
        self.tiles.get(identity.as_str())
    }

    /// `false` when there is no tile.
    pub fn placeholder_visible(&self, identity: &ParticipantIdentity) -> bool {
        self.tile(identity).is_some_and(|t| t.placeholder_visible)
    }

    /// `false` when there is no tile.
    pub fn mute_badge_visible(&self, identity: &ParticipantIdentity) -> bool {
        self.tile(identity).is_some_and(|t| t.mute_badge_visible)
    }

    pub fn has_audio_element(&self, identity: &ParticipantIdentity) -> bool {
        self.audio_elements.contains(&view::audio_id(identity))
    }

    pub fn audio_element_count(&self) -> usize {
        self.audio_elements.len()
    }

    /// Sids of the tracks attached to `element_id`, in attach order.
    pub fn attached_tracks(&self, element_id: &str) -> Vec<String> {
        self.attached.get(element_id).cloned().unwrap_or_default()
    }

    pub fn grid_layout(&self) -> GridLayout {
        self.grid
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    pub fn control_label(&self, control: Control) -> Option<&str> {
        self.labels.get(&control).map(String::as_str)
    }

    pub fn control_enabled(&self, control: Control) -> bool {
        self.enabled.get(&control).copied().unwrap_or(false)
    }

    pub fn control_visible(&self, control: Control) -> bool {
        self.visible
            .get(&control)
            .copied()
            .unwrap_or(control != Control::EndRoom)
    }

    pub fn lobby_visible(&self) -> bool {
        self.lobby_visible
    }

    fn tile_mut(&mut self, identity: &ParticipantIdentity) -> Option<&mut TileState> {
        self.tiles.get_mut(identity.as_str())
    }
}

impl ViewSurface for MemorySurface {
    fn create_tile(&mut self, tile: &TileSpec) {
        self.video_elements.insert(tile.video_id.clone());
        self.tiles.insert(
            tile.identity.as_str().to_string(),
            TileState {
                spec: tile.clone(),
                placeholder_visible: true,
                mute_badge_visible: false,
            },
        );
    }

    fn has_element(&self, id: &str) -> bool {
        self.video_elements.contains(id)
            || self.audio_elements.contains(id)
            || self
                .tiles
                .values()
                .any(|t| t.spec.tile_id == id || t.spec.mute_badge_id == id)
    }

    fn remove_element(&mut self, id: &str) {
        let removed_tile = self
            .tiles
            .iter()
            .find(|(_, t)| t.spec.tile_id == id)
            .map(|(key, t)| (key.clone(), t.spec.video_id.clone()));

        if let Some((key, video_id)) = removed_tile {
            self.tiles.remove(&key);
            self.video_elements.remove(&video_id);
            self.attached.remove(&video_id);
        }

        if let Some(tile) = self.tiles.values_mut().find(|t| t.spec.mute_badge_id == id) {
            tile.mute_badge_visible = false;
        }

        self.video_elements.remove(id);
        self.audio_elements.remove(id);
        self.attached.remove(id);
    }

    fn create_video_element(&mut self, identity: &ParticipantIdentity) {
        self.video_elements.insert(view::video_id(identity));
    }

    fn create_audio_element(&mut self, identity: &ParticipantIdentity) {
        self.audio_elements.insert(view::audio_id(identity));
    }

    fn attach_track(&mut self, element_id: &str, track: &TrackHandle) -> Result<(), AttachError> {
        if self.failing_tracks.contains(&track.sid) {
            return Err(AttachError::Rejected(track.sid.clone()));
        }
        if !self.video_elements.contains(element_id) && !self.audio_elements.contains(element_id) {
            return Err(AttachError::MissingElement(element_id.to_string()));
        }

        let tracks = self.attached.entry(element_id.to_string()).or_default();
        if !tracks.contains(&track.sid) {
            tracks.push(track.sid.clone());
        }
        Ok(())
    }

    fn detach_track(&mut self, element_id: &str, track: &TrackHandle) {
        if let Some(tracks) = self.attached.get_mut(element_id) {
            tracks.retain(|sid| sid != &track.sid);
        }
    }

    fn set_placeholder_visible(&mut self, identity: &ParticipantIdentity, visible: bool) {
        if let Some(tile) = self.tile_mut(identity) {
            tile.placeholder_visible = visible;
        }
    }

    fn set_mute_badge_visible(&mut self, identity: &ParticipantIdentity, visible: bool) {
        if let Some(tile) = self.tile_mut(identity) {
            tile.mute_badge_visible = visible;
        }
    }

    fn set_grid_layout(&mut self, layout: GridLayout) {
        self.grid = layout;
    }

    fn clear_participants(&mut self) {
        for tile in self.tiles.values() {
            self.attached.remove(&tile.spec.video_id);
        }
        self.tiles.clear();
        self.video_elements.clear();
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn set_control_label(&mut self, control: Control, label: &str) {
        self.labels.insert(control, label.to_string());
    }

    fn set_control_enabled(&mut self, control: Control, enabled: bool) {
        self.enabled.insert(control, enabled);
    }

    fn set_control_visible(&mut self, control: Control, visible: bool) {
        self.visible.insert(control, visible);
    }

    fn show_lobby(&mut self, visible: bool) {
        self.lobby_visible = visible;
    }
}

/// A session capability that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Connect,
    Disconnect,
    Devices,
    CameraAndMicrophone,
    Microphone,
    Camera,
    ScreenShare,
    Metadata,
}

/// A call made against `MockRoomSession`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Connect { url: String, token: String },
    Disconnect,
    AvailableDevices,
    EnableCameraAndMicrophone,
    SetMicrophoneEnabled(bool),
    SetCameraEnabled(bool),
    SetScreenShareEnabled(bool),
    SetMetadata(String),
}

#[derive(Debug)]
struct MockState {
    connection: ConnectionState,
    devices: DeviceAvailability,
    failing: HashSet<Capability>,
    calls: Vec<SessionCall>,
    metadata: Vec<String>,
}

/// A `RoomSession` that records calls and succeeds unless told otherwise.
#[derive(Debug)]
pub struct MockRoomSession {
    identity: ParticipantIdentity,
    state: Mutex<MockState>,
}

impl MockRoomSession {
    /// A session whose machine has a camera and a microphone.
    pub fn new(identity: impl Into<ParticipantIdentity>) -> Self {
        Self {
            identity: identity.into(),
            state: Mutex::new(MockState {
                connection: ConnectionState::Disconnected,
                devices: DeviceAvailability {
                    has_camera: true,
                    has_microphone: true,
                },
                failing: HashSet::new(),
                calls: Vec::new(),
                metadata: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn with_devices(self, has_camera: bool, has_microphone: bool) -> Self {
        self.lock().devices = DeviceAvailability {
            has_camera,
            has_microphone,
        };
        self
    }

    #[must_use]
    pub fn failing(self, capability: Capability) -> Self {
        self.set_failing(capability, true);
        self
    }

    pub fn set_failing(&self, capability: Capability, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing.insert(capability);
        } else {
            state.failing.remove(&capability);
        }
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.lock().calls.clone()
    }

    pub fn was_called(&self, matches: impl Fn(&SessionCall) -> bool) -> bool {
        self.lock().calls.iter().any(matches)
    }

    /// Metadata blobs published through `set_metadata`, oldest first.
    pub fn published_metadata(&self) -> Vec<String> {
        self.lock().metadata.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call`, then fail if not connected or `capability` is failing.
    fn record(&self, call: SessionCall, capability: Capability) -> Result<(), SessionError> {
        let mut state = self.lock();
        state.calls.push(call);

        if state.connection != ConnectionState::Connected {
            return Err(SessionError::NotConnected);
        }
        if state.failing.contains(&capability) {
            return Err(match capability {
                Capability::Metadata => SessionError::Metadata("metadata update rejected".to_string()),
                Capability::Disconnect => SessionError::Disconnect("disconnect failed".to_string()),
                Capability::Connect => SessionError::Connect("connection refused".to_string()),
                _ => SessionError::Device("Permission denied".to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RoomSession for MockRoomSession {
    async fn connect(&self, url: &str, token: &str) -> Result<(), SessionError> {
        let mut state = self.lock();
        state.calls.push(SessionCall::Connect {
            url: url.to_string(),
            token: token.to_string(),
        });

        if state.failing.contains(&Capability::Connect) {
            return Err(SessionError::Connect("connection refused".to_string()));
        }
        state.connection = ConnectionState::Connected;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SessionError> {
        self.record(SessionCall::Disconnect, Capability::Disconnect)?;
        self.lock().connection = ConnectionState::Disconnected;
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.lock().connection
    }

    fn local_identity(&self) -> Option<ParticipantIdentity> {
        (self.connection_state() == ConnectionState::Connected).then(|| self.identity.clone())
    }

    async fn available_devices(&self) -> Result<DeviceAvailability, SessionError> {
        self.record(SessionCall::AvailableDevices, Capability::Devices)?;
        Ok(self.lock().devices)
    }

    async fn enable_camera_and_microphone(&self) -> Result<(), SessionError> {
        self.record(
            SessionCall::EnableCameraAndMicrophone,
            Capability::CameraAndMicrophone,
        )
    }

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        self.record(
            SessionCall::SetMicrophoneEnabled(enabled),
            Capability::Microphone,
        )
    }

    async fn set_camera_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        self.record(SessionCall::SetCameraEnabled(enabled), Capability::Camera)
    }

    async fn set_screen_share_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        self.record(
            SessionCall::SetScreenShareEnabled(enabled),
            Capability::ScreenShare,
        )
    }

    async fn set_metadata(&self, metadata: &str) -> Result<(), SessionError> {
        self.record(
            SessionCall::SetMetadata(metadata.to_string()),
            Capability::Metadata,
        )?;
        self.lock().metadata.push(metadata.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::events::TrackKind;

    #[test]
    fn test_surface_starts_in_lobby() {
        let surface = MemorySurface::new();

        assert!(surface.lobby_visible());
        assert!(!surface.control_enabled(Control::Mute));
        assert!(!surface.control_visible(Control::EndRoom));
        assert!(surface.control_visible(Control::Leave));
    }

    #[test]
    fn test_removing_tile_removes_its_video_element() {
        let mut surface = MemorySurface::new();
        let bob = ParticipantIdentity::from("bob");
        surface.create_tile(&TileSpec::for_participant(&bob, false));
        surface
            .attach_track("video-bob", &TrackHandle::new("TR_v", TrackKind::Video))
            .unwrap();

        surface.remove_element("participant-bob");

        assert!(!surface.has_tile(&bob));
        assert!(!surface.has_element("video-bob"));
        assert!(surface.attached_tracks("video-bob").is_empty());
    }

    #[test]
    fn test_attach_to_missing_element_fails() {
        let mut surface = MemorySurface::new();

        let err = surface
            .attach_track("video-nobody", &TrackHandle::new("TR_v", TrackKind::Video))
            .unwrap_err();

        assert_eq!(err, AttachError::MissingElement("video-nobody".to_string()));
    }

    #[tokio::test]
    async fn test_session_requires_connection() {
        let session = MockRoomSession::new("alice");

        assert_eq!(
            session.set_microphone_enabled(false).await,
            Err(SessionError::NotConnected)
        );
        assert!(session.local_identity().is_none());

        session.connect("wss://media", "jwt").await.unwrap();

        assert!(session.set_microphone_enabled(false).await.is_ok());
        assert_eq!(session.local_identity(), Some(ParticipantIdentity::from("alice")));
    }

    #[tokio::test]
    async fn test_session_scripted_failure() {
        let session = MockRoomSession::new("alice").failing(Capability::Camera);
        session.connect("wss://media", "jwt").await.unwrap();

        assert!(matches!(
            session.set_camera_enabled(false).await,
            Err(SessionError::Device(_))
        ));

        session.set_failing(Capability::Camera, false);
        assert!(session.set_camera_enabled(false).await.is_ok());
    }

    #[tokio::test]
    async fn test_session_records_metadata() {
        let session = MockRoomSession::new("alice");
        session.connect("wss://media", "jwt").await.unwrap();

        session.set_metadata(r#"{"muted":true}"#).await.unwrap();

        assert_eq!(session.published_metadata(), vec![r#"{"muted":true}"#.to_string()]);
        assert!(session.was_called(|c| matches!(c, SessionCall::SetMetadata(_))));
    }
}
