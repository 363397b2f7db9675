//! # Token Service Test Utilities
//!
//! Shared test utilities for the token service.
//!
//! This crate provides:
//! - Server test harness (`TestTokenServer` for E2E tests)
//! - Well-known test credentials
//!
//! ## Usage
//!
//! ```rust,ignore
//! use token_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestTokenServer::spawn().await?;
//!     let response = reqwest::get(format!("{}/health", server.url())).await?;
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

pub use server_harness::*;
