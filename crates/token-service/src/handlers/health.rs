//! Liveness endpoint.

/// Handler for GET /health
///
/// Returns plain text "OK" while the process is serving requests. Does not
/// contact the room backend.
pub async fn health_check() -> &'static str {
    "OK"
}
