//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use these types
//! for the media server API secret and for any minted access token that is
//! held in a struct deriving `Debug`.
//!
//! `SecretString` implements `Debug` with redaction, so a struct deriving
//! `Debug` that contains one prints `[REDACTED]` instead of the value. The
//! value is zeroized when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct Credentials {
//!     api_key: String,
//!     api_secret: SecretString,
//! }
//!
//! let creds = Credentials {
//!     api_key: "APIdevkey".to_string(),
//!     api_secret: SecretString::from("devsecret"),
//! };
//!
//! assert!(!format!("{creds:?}").contains("devsecret"));
//! assert_eq!(creds.api_secret.expose_secret(), "devsecret");
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("livekit-secret");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("livekit-secret"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("livekit-secret");
        assert_eq!(secret.expose_secret(), "livekit-secret");
    }

    #[test]
    fn test_struct_with_secret_is_safe() {
        #[allow(dead_code)]
        #[derive(Debug)]
        struct ServerCredentials {
            api_key: String,
            api_secret: SecretString,
        }

        let creds = ServerCredentials {
            api_key: "APIkey123".to_string(),
            api_secret: SecretString::from("super-secret"),
        };

        let debug_str = format!("{creds:?}");

        assert!(debug_str.contains("APIkey123"));
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super-secret"));
    }
}
