//! Event dispatch table.
//!
//! Built once per session. Each `EventKind` maps to exactly one handler, so
//! an event can never be applied twice by duplicate registrations.

use crate::adapter::ViewAdapter;
use crate::errors::DispatchError;
use crate::events::{EventKind, RoomEvent};
use crate::view::ViewSurface;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

pub type EventHandler = fn(&mut ViewAdapter, &mut dyn ViewSurface, &RoomEvent);

#[derive(Default)]
pub struct DispatchTable {
    handlers: HashMap<EventKind, EventHandler>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::DuplicateHandler` if `kind` already has one.
    pub fn register(&mut self, kind: EventKind, handler: EventHandler) -> Result<(), DispatchError> {
        match self.handlers.entry(kind) {
            Entry::Occupied(_) => Err(DispatchError::DuplicateHandler(kind)),
            Entry::Vacant(slot) => {
                slot.insert(handler);
                Ok(())
            }
        }
    }

    /// The table that routes every room event to the view adapter.
    ///
    /// # Errors
    ///
    /// Only fails if two registrations below share a kind.
    pub fn for_view_adapter() -> Result<Self, DispatchError> {
        let mut table = Self::new();
        table.register(EventKind::Connected, on_connected)?;
        table.register(EventKind::Disconnected, on_disconnected)?;
        table.register(EventKind::ParticipantConnected, on_participant_connected)?;
        table.register(EventKind::ParticipantDisconnected, on_participant_disconnected)?;
        table.register(EventKind::TrackPublished, on_track_published)?;
        table.register(EventKind::TrackSubscribed, on_track_subscribed)?;
        table.register(EventKind::TrackUnsubscribed, on_track_unsubscribed)?;
        table.register(EventKind::TrackMuted, on_mute_signal)?;
        table.register(EventKind::TrackUnmuted, on_mute_signal)?;
        table.register(EventKind::ParticipantMetadataChanged, on_metadata_changed)?;
        table.register(EventKind::LocalTrackPublished, on_local_track_published)?;
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Run the handler registered for the event's kind.
    ///
    /// Returns `false` if none is registered.
    pub fn dispatch(
        &self,
        adapter: &mut ViewAdapter,
        surface: &mut dyn ViewSurface,
        event: &RoomEvent,
    ) -> bool {
        let kind = event.kind();
        match self.handlers.get(&kind) {
            Some(handler) => {
                handler(adapter, surface, event);
                true
            }
            None => {
                debug!(target: "room_client.dispatch", kind = %kind, "No handler registered");
                false
            }
        }
    }
}

fn on_connected(adapter: &mut ViewAdapter, surface: &mut dyn ViewSurface, event: &RoomEvent) {
    if let RoomEvent::Connected { participants } = event {
        adapter.on_connected(surface, participants);
    }
}

/// Logged only. The owning conference tears the view down.
fn on_disconnected(_: &mut ViewAdapter, _: &mut dyn ViewSurface, event: &RoomEvent) {
    if let RoomEvent::Disconnected { reason } = event {
        debug!(target: "room_client.dispatch", ?reason, "Session disconnected");
    }
}

fn on_participant_connected(
    adapter: &mut ViewAdapter,
    surface: &mut dyn ViewSurface,
    event: &RoomEvent,
) {
    if let RoomEvent::ParticipantConnected(participant) = event {
        adapter.on_participant_connected(surface, participant);
    }
}

fn on_participant_disconnected(
    adapter: &mut ViewAdapter,
    surface: &mut dyn ViewSurface,
    event: &RoomEvent,
) {
    if let RoomEvent::ParticipantDisconnected { identity } = event {
        adapter.on_participant_disconnected(surface, identity);
    }
}

fn on_track_published(adapter: &mut ViewAdapter, surface: &mut dyn ViewSurface, event: &RoomEvent) {
    if let RoomEvent::TrackPublished {
        participant,
        publication,
    } = event
    {
        adapter.on_track_published(surface, participant, publication);
    }
}

fn on_track_subscribed(adapter: &mut ViewAdapter, surface: &mut dyn ViewSurface, event: &RoomEvent) {
    if let RoomEvent::TrackSubscribed {
        participant,
        publication,
        track,
    } = event
    {
        adapter.on_track_subscribed(surface, participant, publication, track);
    }
}

fn on_track_unsubscribed(
    adapter: &mut ViewAdapter,
    surface: &mut dyn ViewSurface,
    event: &RoomEvent,
) {
    if let RoomEvent::TrackUnsubscribed { participant, track } = event {
        adapter.on_track_unsubscribed(surface, participant, track);
    }
}

fn on_mute_signal(adapter: &mut ViewAdapter, surface: &mut dyn ViewSurface, event: &RoomEvent) {
    match event {
        RoomEvent::TrackMuted {
            participant,
            kind,
            scope,
        } => adapter.on_mute_signal(surface, participant, *kind, *scope, true),
        RoomEvent::TrackUnmuted {
            participant,
            kind,
            scope,
        } => adapter.on_mute_signal(surface, participant, *kind, *scope, false),
        _ => {}
    }
}

fn on_metadata_changed(adapter: &mut ViewAdapter, surface: &mut dyn ViewSurface, event: &RoomEvent) {
    if let RoomEvent::ParticipantMetadataChanged {
        participant,
        metadata,
    } = event
    {
        adapter.on_metadata_changed(surface, participant, metadata);
    }
}

fn on_local_track_published(
    adapter: &mut ViewAdapter,
    surface: &mut dyn ViewSurface,
    event: &RoomEvent,
) {
    if let RoomEvent::LocalTrackPublished { publication } = event {
        adapter.on_local_track_published(surface, publication);
    }
}
