//! Huddle Token Service Library
//!
//! Mints signed access tokens for the media server and fronts the small set
//! of room administration calls the browser client needs:
//!
//! - `POST /get-token` - access token for a room
//! - `POST /check-room` - does the room exist yet
//! - `POST /set-room-metadata` - publish room metadata
//! - `POST /end-room` - end the room for everyone (creator only)
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> RoomBackend (LiveKit | memory)
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Request and response bodies
//! - `observability` - Prometheus metrics
//! - `routes` - Axum router setup
//! - `services` - Token minting, creator registry and room backends

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
