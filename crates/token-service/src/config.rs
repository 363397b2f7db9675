//! Token Service configuration.
//!
//! Configuration is loaded from environment variables. The API secret is
//! held in a `SecretString` and redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default media server URL handed to clients.
pub const DEFAULT_LIVEKIT_HOST: &str = "wss://localhost:7880";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default participant token lifetime in seconds (24 hours).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 86_400;

/// Longest accepted participant token lifetime in seconds (30 days).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 30 * 86_400;

/// Which room backend answers `/check-room`, `/set-room-metadata` and `/end-room`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomBackendKind {
    /// The media server's room service API.
    LiveKit,
    /// Process-local room registry (development and tests).
    Memory,
}

impl FromStr for RoomBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "livekit" => Ok(RoomBackendKind::LiveKit),
            "memory" => Ok(RoomBackendKind::Memory),
            other => Err(ConfigError::InvalidRoomBackend(format!(
                "ROOM_BACKEND must be 'livekit' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

/// Token Service configuration.
#[derive(Clone)]
pub struct Config {
    /// Media server URL returned to clients alongside their token.
    pub livekit_host: String,

    /// API key, used as the token issuer.
    pub api_key: String,

    /// API secret used to sign tokens.
    pub api_secret: SecretString,

    /// Server bind address (default: "0.0.0.0:3001").
    pub bind_address: String,

    /// Room backend selection (default: LiveKit).
    pub room_backend: RoomBackendKind,

    /// Participant token lifetime in seconds.
    pub token_ttl_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("livekit_host", &self.livekit_host)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("room_backend", &self.room_backend)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid port configuration: {0}")]
    InvalidPort(String),

    #[error("Invalid token TTL configuration: {0}")]
    InvalidTokenTtl(String),

    #[error("Invalid room backend configuration: {0}")]
    InvalidRoomBackend(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let livekit_host = vars
            .get("LIVEKIT_HOST")
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_LIVEKIT_HOST.to_string());

        let api_key = required(vars, "LIVEKIT_API_KEY")?;
        let api_secret = SecretString::from(required(vars, "LIVEKIT_API_SECRET")?);

        let port = if let Some(value_str) = vars.get("PORT") {
            let value: u16 = value_str.parse().map_err(|e| {
                ConfigError::InvalidPort(format!(
                    "PORT must be a valid port number, got '{}': {}",
                    value_str, e
                ))
            })?;
            value
        } else {
            DEFAULT_PORT
        };

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| format!("0.0.0.0:{}", port));

        let room_backend = match vars.get("ROOM_BACKEND") {
            Some(value) => value.parse()?,
            None => RoomBackendKind::LiveKit,
        };

        let token_ttl_seconds = if let Some(value_str) = vars.get("TOKEN_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidTokenTtl(
                    "TOKEN_TTL_SECONDS must be greater than 0".to_string(),
                ));
            }

            if value > MAX_TOKEN_TTL_SECONDS {
                return Err(ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must be at most {}, got {}",
                    MAX_TOKEN_TTL_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_TOKEN_TTL_SECONDS
        };

        Ok(Config {
            livekit_host,
            api_key,
            api_secret,
            bind_address,
            room_backend,
            token_ttl_seconds,
        })
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
