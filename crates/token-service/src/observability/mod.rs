//! Observability for the token service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
