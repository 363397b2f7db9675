//! Room client configuration.

use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Default token service base URL.
pub const DEFAULT_TOKEN_SERVICE_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the token service, without a trailing slash.
    pub token_service_url: String,

    /// Applied to every token service call. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid request timeout: {0}")]
    InvalidTimeout(String),
}

impl ClientConfig {
    pub fn new(token_service_url: impl Into<String>) -> Self {
        let url: String = token_service_url.into();
        Self {
            token_service_url: url.trim_end_matches('/').to_string(),
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from a map of variables.
    ///
    /// - `TOKEN_SERVICE_URL` (default `http://localhost:3001`)
    /// - `TOKEN_REQUEST_TIMEOUT_SECONDS` (optional, positive)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let url = vars
            .get("TOKEN_SERVICE_URL")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TOKEN_SERVICE_URL);

        let mut config = Self::new(url);

        if let Some(raw) = vars.get("TOKEN_REQUEST_TIMEOUT_SECONDS") {
            let seconds: u64 = raw.trim().parse().map_err(|e| {
                ConfigError::InvalidTimeout(format!(
                    "TOKEN_REQUEST_TIMEOUT_SECONDS must be a positive integer, got '{}': {}",
                    raw, e
                ))
            })?;
            if seconds == 0 {
                return Err(ConfigError::InvalidTimeout(
                    "TOKEN_REQUEST_TIMEOUT_SECONDS must be greater than zero".to_string(),
                ));
            }
            config.request_timeout = Some(Duration::from_secs(seconds));
        }

        Ok(config)
    }
}
