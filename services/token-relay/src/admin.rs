//! Ops listener
//!
//! Runs on a separate listener (`[admin] listen_addr`) so the relay port keeps
//! answering 404 for everything except the token path.
//!
//! Endpoints:
//! - GET /health  — liveness with uptime and counters
//! - GET /metrics — Prometheus text exposition

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state for ops handlers
#[derive(Clone)]
pub struct AdminState {
    pub started_at: Instant,
    pub requests_total: Arc<AtomicU64>,
    pub upstream_errors_total: Arc<AtomicU64>,
    pub prometheus: PrometheusHandle,
}

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<AdminState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "requests_served": state.requests_total.load(Ordering::Relaxed),
        "upstream_errors": state.upstream_errors_total.load(Ordering::Relaxed),
    });
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

async fn metrics_handler(State(state): State<AdminState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}
