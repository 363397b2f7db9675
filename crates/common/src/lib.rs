//! Common utilities and types shared across Huddle components.

#![warn(clippy::pedantic)]

/// Module for validated room and participant name types
pub mod types;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for media-room access tokens (claims, video grants, signing)
pub mod jwt;
