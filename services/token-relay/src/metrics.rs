//! Prometheus metrics exposition
//!
//! - `relay_requests_total` (counter): labels `grant_type`, `status`
//! - `relay_request_duration_seconds` (histogram): label `status`
//! - `relay_upstream_errors_total` (counter): label `error_type`
//!
//! `grant_type` is `none` for requests rejected before a grant type was known.

use anyhow::Context;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_METRIC: &str = "relay_request_duration_seconds";

/// 5ms to 60s; a token exchange is one round trip to the provider.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

fn builder() -> anyhow::Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(DURATION_METRIC.to_string()), DURATION_BUCKETS)
        .context("failed to set histogram buckets")
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    builder()?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Record a completed relay request.
pub fn record_request(status: u16, grant_type: &'static str, duration_secs: f64) {
    let status = status.to_string();
    metrics::counter!("relay_requests_total", "status" => status.clone(), "grant_type" => grant_type)
        .increment(1);
    metrics::histogram!(DURATION_METRIC, "status" => status).record(duration_secs);
}

/// Record a transport failure talking to the token endpoint.
pub fn record_upstream_error(error_type: &'static str) {
    metrics::counter!("relay_upstream_errors_total", "error_type" => error_type).increment(1);
}
