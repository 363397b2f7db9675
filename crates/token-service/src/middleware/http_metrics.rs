//! HTTP metrics middleware.
//!
//! Applied as the outermost layer so that framework-level rejections
//! (415 wrong Content-Type, 400/422 JSON errors, 404, 405) are counted
//! alongside handler responses.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Record method, normalized path, status code and duration of every request.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    async fn handler_200() -> &'static str {
        "OK"
    }

    async fn handler_502() -> (StatusCode, &'static str) {
        (StatusCode::BAD_GATEWAY, "upstream")
    }

    fn test_app() -> Router {
        Router::new()
            .route("/check-room", post(handler_200))
            .route("/end-room", post(handler_502))
            .layer(middleware::from_fn(http_metrics_middleware))
    }

    async fn send(uri: &str, method: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request builder should succeed");

        test_app()
            .oneshot(request)
            .await
            .expect("request should succeed")
            .status()
    }

    #[tokio::test]
    async fn test_middleware_passes_success_through() {
        assert_eq!(send("/check-room", "POST").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_passes_error_through() {
        assert_eq!(send("/end-room", "POST").await, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_middleware_sees_framework_rejections() {
        assert_eq!(send("/nonexistent", "POST").await, StatusCode::NOT_FOUND);
        assert_eq!(
            send("/check-room", "GET").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
