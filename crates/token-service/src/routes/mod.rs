//! HTTP routes for the token service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::{CreatorRegistry, RoomBackend};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Room administration backend (media server API or in-memory).
    pub room_backend: Arc<dyn RoomBackend>,

    /// Creator recorded per room.
    pub creators: Arc<CreatorRegistry>,
}

/// Build the application routes.
///
/// - `POST /get-token`
/// - `POST /check-room`
/// - `POST /set-room-metadata`
/// - `POST /end-room`
/// - `GET /health` - liveness probe
/// - `GET /metrics` - Prometheus scrape endpoint
/// - TraceLayer for request logging
/// - 30 second request timeout
/// - HTTP metrics middleware (outermost)
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/get-token", post(handlers::get_token))
        .route("/check-room", post(handlers::check_room))
        .route("/set-room-metadata", post(handlers::set_room_metadata))
        .route("/end-room", post(handlers::end_room))
        .route("/health", get(handlers::health_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. http_metrics_middleware (outermost)
    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::services::InMemoryRoomBackend;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::collections::HashMap;
    use tower::ServiceExt;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    fn test_app() -> Router {
        let config = Config::from_vars(&HashMap::from([
            ("LIVEKIT_API_KEY".to_string(), "APItest".to_string()),
            (
                "LIVEKIT_API_SECRET".to_string(),
                "test-secret-test-secret-test-sec".to_string(),
            ),
        ]))
        .unwrap();
        let state = Arc::new(AppState {
            config,
            room_backend: Arc::new(InMemoryRoomBackend::new()),
            creators: Arc::new(CreatorRegistry::new()),
        });
        let handle = PrometheusBuilder::new().build_recorder().handle();
        build_routes(state, handle)
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_token_route() {
        let response = test_app()
            .oneshot(json_post(
                "/get-token",
                serde_json::json!({"roomName": "standup", "participantName": "alice"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["token"].is_string());
        assert_eq!(body["url"], "wss://localhost:7880");
    }

    #[tokio::test]
    async fn test_get_token_missing_fields_returns_400() {
        let response = test_app()
            .oneshot(json_post("/get-token", serde_json::json!({"roomName": "standup"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Missing room name or participant name"
        );
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), b"OK");
    }

    #[tokio::test]
    async fn test_metrics_route() {
        let response = test_app()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_on_post_route_is_rejected() {
        let response = test_app()
            .oneshot(Request::get("/get-token").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
