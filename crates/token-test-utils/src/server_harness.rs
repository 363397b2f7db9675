//! Test server harness for E2E testing
//!
//! Provides `TestTokenServer` for spawning real token service instances in
//! tests, backed by the in-memory room backend.

use common::jwt::{verify_access_token, AccessTokenClaims};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use token_service::config::Config;
use token_service::routes::{self, AppState};
use token_service::services::{CreatorRegistry, InMemoryRoomBackend, RoomBackend};

/// API key the harness configures.
pub const TEST_API_KEY: &str = "APItestkey";

/// API secret the harness configures.
pub const TEST_API_SECRET: &str = "test-secret-that-is-long-enough-0123";

/// Media server URL the harness returns from `/get-token`.
pub const TEST_LIVEKIT_HOST: &str = "wss://media.test.local";

/// Test harness for spawning the token service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// let server = TestTokenServer::spawn().await?;
/// let response = reqwest::Client::new()
///     .post(format!("{}/get-token", server.url()))
///     .json(&serde_json::json!({"roomName": "standup", "participantName": "alice"}))
///     .send()
///     .await?;
/// assert_eq!(response.status(), 200);
/// ```
pub struct TestTokenServer {
    addr: SocketAddr,
    config: Config,
    room_backend: Arc<InMemoryRoomBackend>,
    _handle: JoinHandle<()>,
}

impl TestTokenServer {
    /// Spawn a new test server instance with an empty in-memory backend.
    ///
    /// The server binds to a random available port (127.0.0.1:0) and runs in
    /// the background until the harness is dropped.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            ("LIVEKIT_HOST".to_string(), TEST_LIVEKIT_HOST.to_string()),
            ("LIVEKIT_API_KEY".to_string(), TEST_API_KEY.to_string()),
            ("LIVEKIT_API_SECRET".to_string(), TEST_API_SECRET.to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("ROOM_BACKEND".to_string(), "memory".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let room_backend = Arc::new(InMemoryRoomBackend::new());
        let state = Arc::new(AppState {
            config: config.clone(),
            room_backend: room_backend.clone(),
            creators: Arc::new(CreatorRegistry::new()),
        });

        // Not installed globally; several servers may run in one test binary.
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            room_backend,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the in-memory room backend behind the server.
    pub fn rooms(&self) -> &InMemoryRoomBackend {
        &self.room_backend
    }

    /// Create a room directly in the backend, bypassing HTTP.
    pub async fn seed_room(&self, name: &str) -> Result<(), anyhow::Error> {
        let room = common::types::RoomName::parse(name)?;
        self.room_backend
            .ensure_room(&room)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed room: {}", e))?;
        Ok(())
    }

    /// Verify a token minted by this server and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<AccessTokenClaims, anyhow::Error> {
        Ok(verify_access_token(
            token,
            TEST_API_KEY,
            &self.config.api_secret,
        )?)
    }
}

impl Drop for TestTokenServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
