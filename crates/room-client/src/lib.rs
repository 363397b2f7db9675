//! Huddle Room Client Library
//!
//! The client half of a call: fetch a token, connect the room session and
//! keep the participant grid in step with the session's events.
//!
//! The media SDK's room object is abstracted by [`session::RoomSession`] and
//! the rendered page by [`view::ViewSurface`], so everything here runs the
//! same against a browser binding, a native UI or the in-memory [`mock`]
//! types.
//!
//! # Architecture
//!
//! ```text
//! Conference -> TokenClient -> token service
//!            -> RoomSession (connect, devices, metadata)
//!            -> DispatchTable -> ViewAdapter -> ViewSurface
//! ```
//!
//! # Modules
//!
//! - `adapter` - Participant tiles, track attachments and mute state
//! - `conference` - Join, leave, end-room and local control toggles
//! - `config` - Client configuration from environment
//! - `controls` - Local control flags and labels
//! - `dispatch` - One handler per room event kind
//! - `errors` - Error types
//! - `events` - Room session events
//! - `mock` - In-memory surface and scripted session
//! - `session` - Room session seam
//! - `token_client` - Token service HTTP client
//! - `view` - Surface trait, element ids, grid layout, notifications

pub mod adapter;
pub mod conference;
pub mod config;
pub mod controls;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod mock;
pub mod session;
pub mod token_client;
pub mod view;

pub use conference::Conference;
pub use config::ClientConfig;
pub use token_client::TokenClient;
