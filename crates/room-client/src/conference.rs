//! Join, leave and end-room orchestration.
//!
//! `Conference` owns everything one call needs: the token client, the room
//! session, the surface, the view adapter and the local flags. Methods take
//! `&mut self`, so a single owner serializes every user action and event.
//!
//! User-facing failures become notifications on the surface; nothing here
//! returns an error to the caller.

use crate::adapter::{MuteMetadata, ViewAdapter};
use crate::controls::{LocalControl, SessionFlags};
use crate::dispatch::DispatchTable;
use crate::events::{DisconnectReason, RoomEvent};
use crate::session::{ConnectionState, DeviceAvailability, RoomSession};
use crate::token_client::TokenClient;
use crate::view::{Control, Notification, ViewSurface};
use common::types::{ParticipantIdentity, RoomName};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

pub const MISSING_NAMES_MESSAGE: &str = "Please enter both room name and your name";
pub const ALREADY_CONNECTED_MESSAGE: &str = "Already connected to a room";
pub const NOT_CONNECTED_MESSAGE: &str = "Not connected to room";
pub const NOT_CREATOR_MESSAGE: &str = "Only the room creator can end the room";
pub const DISCONNECTED_MESSAGE: &str = "Disconnected from room";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveCall {
    room: RoomName,
    identity: ParticipantIdentity,
}

pub struct Conference<S: RoomSession, V: ViewSurface> {
    client: TokenClient,
    session: S,
    surface: V,
    adapter: ViewAdapter,
    dispatch: Option<DispatchTable>,
    flags: SessionFlags,
    active: Option<ActiveCall>,
}

impl<S: RoomSession, V: ViewSurface> Conference<S, V> {
    pub fn new(client: TokenClient, session: S, surface: V) -> Self {
        Self {
            client,
            session,
            surface,
            adapter: ViewAdapter::new(),
            dispatch: None,
            flags: SessionFlags::default(),
            active: None,
        }
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    pub fn adapter(&self) -> &ViewAdapter {
        &self.adapter
    }

    /// Whether a call is in progress.
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    pub fn room(&self) -> Option<&RoomName> {
        self.active.as_ref().map(|call| &call.room)
    }

    fn notify(&mut self, notification: Notification) {
        self.surface.notify(notification);
    }

    /// Join `room_name` as `participant_name`.
    #[instrument(skip(self))]
    pub async fn join(&mut self, room_name: &str, participant_name: &str) {
        if self.active.is_some() {
            self.notify(Notification::warning(ALREADY_CONNECTED_MESSAGE));
            return;
        }

        let (Ok(room), Ok(name)) = (
            RoomName::parse(room_name),
            ParticipantIdentity::parse(participant_name),
        ) else {
            self.notify(Notification::error(MISSING_NAMES_MESSAGE));
            return;
        };

        let wants_creator = match self.client.check_room(&room).await {
            Ok(exists) => !exists,
            Err(e) => {
                warn!(target: "room_client.conference", room = %room, error = %e, "Room check failed, assuming new room");
                true
            }
        };

        let is_creator = match self.connect(&room, &name, wants_creator).await {
            Ok(granted) => granted,
            Err(message) => {
                self.dispatch = None;
                self.notify(Notification::error(format!("Failed to join room: {}", message)));
                return;
            }
        };
        if wants_creator && !is_creator {
            debug!(target: "room_client.conference", room = %room, "Creator role not granted");
        }

        let identity = self.session.local_identity().unwrap_or_else(|| name.clone());
        self.adapter.mount_local(&mut self.surface, &identity);
        self.flags.is_room_creator = is_creator;
        self.active = Some(ActiveCall {
            room: room.clone(),
            identity: identity.clone(),
        });

        self.enable_devices().await;

        self.surface.show_lobby(false);
        self.surface.set_control_enabled(Control::ScreenShare, true);
        self.surface.set_control_enabled(Control::Leave, true);
        for control in LocalControl::ALL {
            self.surface
                .set_control_label(control.control(), control.label(self.flags.get(control)));
        }

        if is_creator {
            self.surface.set_control_visible(Control::EndRoom, true);
            self.surface.set_control_enabled(Control::EndRoom, true);

            let metadata = json!({
                "creator": identity.as_str(),
                "createdAt": chrono::Utc::now().timestamp_millis(),
            });
            if let Err(e) = self.client.set_room_metadata(&room, &metadata).await {
                warn!(target: "room_client.conference", room = %room, error = %e, "Failed to publish room metadata");
            }
        }

        info!(target: "room_client.conference", room = %room, participant = %identity, is_creator, "Joined room");
        self.notify(Notification::success("Successfully joined the room"));
    }

    /// Fetch a token and connect the session, returning whether the server
    /// granted the creator role. Nothing is mounted on failure.
    async fn connect(
        &mut self,
        room: &RoomName,
        name: &ParticipantIdentity,
        wants_creator: bool,
    ) -> Result<bool, String> {
        let details = self
            .client
            .request_token(room, name, wants_creator)
            .await
            .map_err(|e| e.to_string())?;

        self.dispatch = Some(DispatchTable::for_view_adapter().map_err(|e| e.to_string())?);

        self.session
            .connect(&details.url, &details.token)
            .await
            .map_err(|e| e.to_string())?;

        Ok(details.is_room_creator)
    }

    /// Enable local media, degrading to audio only or view only.
    async fn enable_devices(&mut self) {
        let devices = match self.session.available_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(target: "room_client.conference", error = %e, "Device enumeration failed");
                DeviceAvailability::default()
            }
        };

        if !devices.has_microphone {
            let message = if devices.has_camera {
                Notification::error("No media devices available. You can only view the meeting.")
            } else {
                Notification::warning(
                    "No audio or video devices detected. You can only view the meeting.",
                )
            };
            self.disable_media(true, true);
            self.notify(message);
            return;
        }

        if !devices.has_camera {
            match self.session.set_microphone_enabled(true).await {
                Ok(()) => {
                    self.disable_media(false, true);
                    self.notify(Notification::warning(
                        "No camera detected. Joining with audio only.",
                    ));
                }
                Err(e) => self.media_unavailable(&e.to_string()),
            }
            return;
        }

        match self.session.enable_camera_and_microphone().await {
            Ok(()) => {
                self.surface.set_control_enabled(Control::Mute, true);
                self.surface.set_control_enabled(Control::Video, true);
            }
            Err(e) => {
                warn!(target: "room_client.conference", error = %e, "Camera and microphone unavailable, trying microphone only");
                match self.session.set_microphone_enabled(true).await {
                    Ok(()) => {
                        self.disable_media(false, true);
                        self.notify(Notification::warning(
                            "Could not access camera. Joining with audio only.",
                        ));
                    }
                    Err(e) => self.media_unavailable(&e.to_string()),
                }
            }
        }
    }

    fn media_unavailable(&mut self, reason: &str) {
        warn!(target: "room_client.conference", error = %reason, "Microphone unavailable");
        self.disable_media(true, true);
        self.notify(Notification::error(
            "Could not access any media devices. You can only view the meeting.",
        ));
    }

    /// Mark the listed capabilities unavailable and enable the rest.
    fn disable_media(&mut self, microphone: bool, camera: bool) {
        self.flags.is_muted = microphone;
        self.flags.is_video_off = camera;
        self.surface.set_control_enabled(Control::Mute, !microphone);
        self.surface.set_control_enabled(Control::Video, !camera);
    }

    pub async fn toggle_mute(&mut self) {
        self.toggle(LocalControl::Microphone).await;
    }

    pub async fn toggle_video(&mut self) {
        self.toggle(LocalControl::Camera).await;
    }

    pub async fn toggle_screen_share(&mut self) {
        self.toggle(LocalControl::ScreenShare).await;
    }

    /// Flip `control` optimistically, rolling back if the session refuses.
    #[instrument(skip(self))]
    async fn toggle(&mut self, control: LocalControl) {
        let Some(call) = self.active.clone() else {
            self.notify(Notification::error(NOT_CONNECTED_MESSAGE));
            return;
        };

        let previous = self.flags.get(control);
        let next = !previous;
        self.flags.set(control, next);
        self.surface
            .set_control_label(control.control(), control.label(next));

        let result = match control {
            LocalControl::Microphone => self.session.set_microphone_enabled(!next).await,
            LocalControl::Camera => self.session.set_camera_enabled(!next).await,
            LocalControl::ScreenShare => self.session.set_screen_share_enabled(next).await,
        };

        if let Err(e) = result {
            self.flags.set(control, previous);
            self.surface
                .set_control_label(control.control(), control.label(previous));
            warn!(target: "room_client.conference", control = control.name(), error = %e, "Toggle failed");
            self.notify(Notification::error(format!(
                "Failed to toggle {}: {}",
                control.name(),
                e
            )));
            return;
        }

        match control {
            LocalControl::Microphone => {
                self.adapter
                    .set_mic_muted(&mut self.surface, &call.identity, next);
                let metadata = MuteMetadata::now(next).to_json();
                if let Err(e) = self.session.set_metadata(&metadata).await {
                    warn!(target: "room_client.conference", error = %e, "Failed to broadcast mute state");
                }
            }
            LocalControl::Camera => {
                self.adapter
                    .set_camera_enabled(&mut self.surface, &call.identity, !next);
            }
            LocalControl::ScreenShare => {}
        }

        self.notify(Notification::success(control.success_message(next)));
    }

    /// Leave the call, keeping the room open for everyone else.
    #[instrument(skip(self))]
    pub async fn leave(&mut self) {
        if self.active.is_none() && self.session.connection_state() == ConnectionState::Disconnected {
            self.notify(Notification::error(NOT_CONNECTED_MESSAGE));
            return;
        }

        if let Err(e) = self.session.disconnect().await {
            self.notify(Notification::error(format!("Failed to leave room: {}", e)));
            return;
        }

        self.teardown();
        self.notify(Notification::success("Left the room successfully"));
    }

    /// End the room for every participant. Creator only.
    #[instrument(skip(self))]
    pub async fn end_room(&mut self) {
        let Some(call) = self.active.clone() else {
            self.notify(Notification::error(NOT_CONNECTED_MESSAGE));
            return;
        };

        if !self.flags.is_room_creator {
            self.notify(Notification::warning(NOT_CREATOR_MESSAGE));
            return;
        }

        if let Err(e) = self.client.end_room(&call.room, &call.identity).await {
            self.notify(Notification::error(format!("Failed to end room: {}", e)));
            return;
        }

        if let Err(e) = self.session.disconnect().await {
            debug!(target: "room_client.conference", error = %e, "Disconnect after ending room failed");
        }

        info!(target: "room_client.conference", room = %call.room, "Room ended");
        self.teardown();
        self.notify(Notification::success("Room ended for all participants"));
    }

    /// Apply one room session event.
    pub fn handle_event(&mut self, event: &RoomEvent) {
        let Some(dispatch) = &self.dispatch else {
            debug!(target: "room_client.conference", kind = %event.kind(), "Event outside of a call");
            return;
        };

        dispatch.dispatch(&mut self.adapter, &mut self.surface, event);

        if let RoomEvent::Disconnected { reason } = event {
            info!(target: "room_client.conference", ?reason, "Session disconnected");
            self.teardown();
            if *reason != DisconnectReason::ClientInitiated {
                self.notify(Notification::error(DISCONNECTED_MESSAGE));
            }
        }
    }

    /// Return the surface and the flags to the lobby state.
    fn teardown(&mut self) {
        self.adapter.clear(&mut self.surface);
        self.flags = SessionFlags::default();

        for control in Control::PER_CALL {
            self.surface.set_control_enabled(control, false);
        }
        self.surface.set_control_visible(Control::EndRoom, false);
        for control in LocalControl::ALL {
            self.surface
                .set_control_label(control.control(), control.label(false));
        }
        self.surface.show_lobby(true);

        self.active = None;
        self.dispatch = None;
    }
}
