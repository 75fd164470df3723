//! OAuth Token Relay
//!
//! Single-binary Rust service that lets a public client (browser, mobile app)
//! finish an OAuth token exchange without embedding a client secret:
//! 1. Accepts `POST /oauth/token` with an authorization-code or refresh-token
//!    request as JSON
//! 2. Validates it per grant type
//! 3. Adds the server-held client id and secret and forwards it form-encoded
//!    to Google's token endpoint
//! 4. Relays the provider's status and body back under a fixed CORS header set

mod admin;
mod config;
mod error;
mod metrics;
mod relay;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::admin::{AdminState, build_admin_router};
use crate::config::Config;
use crate::relay::RelayState;

/// Maximum time in-flight requests get to finish after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the relay router. Every path and method goes to the relay handler,
/// which owns routing so that OPTIONS works on any path.
fn build_router(state: RelayState, max_connections: usize) -> Router {
    Router::new()
        .fallback(relay_handler)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting oauth-token-relay");

    let prometheus_handle = metrics::install_recorder()?;
    let started_at = Instant::now();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    match &config_path {
        Some(path) => info!(path = %path.display(), "loading configuration"),
        None => info!("no config file given, using defaults"),
    }

    let config = Config::load(config_path.as_deref()).context("failed to load configuration")?;
    let credentials = config
        .client_credentials()
        .context("client credentials unavailable")?;

    info!(
        listen_addr = %config.relay.listen_addr,
        token_endpoint = %config.relay.token_endpoint,
        admin_addr = ?config.admin.listen_addr,
        max_connections = config.relay.max_connections,
        "configuration loaded"
    );

    let requests_total = Arc::new(AtomicU64::new(0));
    let upstream_errors_total = Arc::new(AtomicU64::new(0));

    let client = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;

    let relay_state = RelayState {
        client,
        token_endpoint: config.relay.token_endpoint.clone(),
        credentials: Arc::new(credentials),
        max_body_bytes: config.relay.max_body_bytes,
        requests_total: requests_total.clone(),
        upstream_errors_total: upstream_errors_total.clone(),
    };

    let app = build_router(relay_state, config.relay.max_connections);
    let listen_addr = config.relay.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    if let Some(admin_addr) = config.admin.listen_addr {
        let admin_app = build_admin_router(AdminState {
            started_at,
            requests_total,
            upstream_errors_total,
            prometheus: prometheus_handle,
        });
        let admin_listener = TcpListener::bind(admin_addr)
            .await
            .with_context(|| format!("failed to bind ops listener to {admin_addr}"))?;
        let admin_shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(admin_listener, admin_app)
                .with_graceful_shutdown(wait_for_shutdown(admin_shutdown))
                .await
            {
                error!(error = %e, "ops listener failed");
            }
        });
        info!(addr = %admin_addr, "ops listener ready");
    }

    // Drain timeout starts when the signal fires, not when the server starts.
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
            .await
    });
    info!(addr = %listen_addr, "accepting requests");

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => info!("all in-flight requests drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "server task panicked"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }

    info!("shutdown complete");
    Ok(())
}

/// Catch-all handler: tags the request with an id and hands it to the relay.
async fn relay_handler(State(state): State<RelayState>, request: Request<Body>) -> Response {
    let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
    relay::handle(&state, request, request_id).await
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
