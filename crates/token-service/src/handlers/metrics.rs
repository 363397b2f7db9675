//! Prometheus metrics endpoint handler.
//!
//! # Security
//!
//! Unauthenticated so Prometheus can scrape it. Labels carry no room names,
//! identities or tokens.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Returns Prometheus text format:
/// ```text
/// # TYPE ts_tokens_issued_total counter
/// ts_tokens_issued_total{role="creator"} 3
/// ```
#[tracing::instrument(skip_all, name = "ts.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
