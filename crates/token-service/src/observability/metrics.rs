//! Metrics definitions for the token service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `ts_` prefix for the token service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods
//! - `endpoint`: the six known routes plus `/other`
//! - `status`: success, error, timeout (HTTP) or success, not_found, error (room backend)
//! - `role`: participant, creator
//! - `operation`: room service RPC names

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle that renders
/// `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("ts_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `ts_http_requests_total`, `ts_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("ts_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("ts_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Map a request path onto a bounded set of endpoint labels.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/get-token" => "/get-token",
        "/check-room" => "/check-room",
        "/set-room-metadata" => "/set-room-metadata",
        "/end-room" => "/end-room",
        "/health" => "/health",
        "/metrics" => "/metrics",
        _ => "/other",
    }
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record a participant token being issued.
///
/// Metric: `ts_tokens_issued_total`
/// Labels: `role`
pub fn record_token_issued(role: &'static str) {
    counter!("ts_tokens_issued_total", "role" => role).increment(1);
}

// ============================================================================
// Room Backend Metrics
// ============================================================================

/// Record a call to the media server's room service.
///
/// Metric: `ts_room_backend_requests_total`
/// Labels: `operation`, `status`
pub fn record_room_backend_request(operation: &'static str, status: &'static str) {
    counter!("ts_room_backend_requests_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(204), "success");
        assert_eq!(categorize_status_code(400), "error");
        assert_eq!(categorize_status_code(502), "error");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
    }

    #[test]
    fn test_normalize_endpoint_known_paths() {
        assert_eq!(normalize_endpoint("/get-token"), "/get-token");
        assert_eq!(normalize_endpoint("/end-room"), "/end-room");
        assert_eq!(normalize_endpoint("/metrics"), "/metrics");
    }

    #[test]
    fn test_normalize_endpoint_unknown_paths() {
        assert_eq!(normalize_endpoint("/"), "/other");
        assert_eq!(normalize_endpoint("/get-token/extra"), "/other");
        assert_eq!(normalize_endpoint("/rooms/abc123"), "/other");
    }

    #[test]
    fn test_metric_names_and_bounded_labels() {
        use metrics_util::debugging::DebuggingRecorder;

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_token_issued("creator");
            record_room_backend_request("DeleteRoom", "not_found");
            record_http_request("POST", "/rooms/abc123", 404, Duration::from_millis(2));
        });

        let keys: Vec<_> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .map(|(composite, _, _, _)| composite.key().clone())
            .collect();

        let names: Vec<&str> = keys.iter().map(|key| key.name()).collect();
        assert!(names.contains(&"ts_tokens_issued_total"));
        assert!(names.contains(&"ts_room_backend_requests_total"));
        assert!(names.contains(&"ts_http_requests_total"));
        assert!(names.contains(&"ts_http_request_duration_seconds"));

        let http_total = keys
            .iter()
            .find(|key| key.name() == "ts_http_requests_total")
            .expect("http counter recorded");
        assert!(http_total
            .labels()
            .any(|label| label.key() == "endpoint" && label.value() == "/other"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        // No global recorder is installed in unit tests.
        record_http_request("POST", "/get-token", 200, Duration::from_millis(3));
        record_token_issued("creator");
        record_room_backend_request("ListRooms", "success");
    }
}
