//! Token relay handler
//!
//! Routes every inbound request, validates token requests, forwards them to
//! the provider's token endpoint with the server-held client credentials, and
//! returns the provider's status and body verbatim under this service's own
//! header set. Upstream headers are never copied.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use token_grant::{ClientCredentials, TokenRequest, upstream_form};
use tracing::{debug, error, info, instrument};

use crate::error::RelayError;
use crate::metrics;

/// The single path the relay serves
pub const TOKEN_PATH: &str = "/oauth/token";

/// Shared state passed to the relay handler via axum State extractor
#[derive(Clone)]
pub struct RelayState {
    pub client: reqwest::Client,
    pub token_endpoint: String,
    pub credentials: Arc<ClientCredentials>,
    pub max_body_bytes: usize,
    pub requests_total: Arc<AtomicU64>,
    pub upstream_errors_total: Arc<AtomicU64>,
}

/// Headers applied to every response, replacing whatever the provider sent.
pub fn relay_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    headers
}

/// CORS preflight answer: 204, empty body.
fn preflight() -> Response {
    (StatusCode::NO_CONTENT, relay_headers()).into_response()
}

/// Handle one inbound request end to end.
///
/// Order: OPTIONS on any path, then path, then method, then body validation.
/// The first check that fails decides the response.
#[instrument(skip_all, fields(request_id = %request_id, method = %request.method(), path = %request.uri().path()))]
pub async fn handle(state: &RelayState, request: Request<Body>, request_id: String) -> Response {
    let start = Instant::now();
    state.requests_total.fetch_add(1, Ordering::Relaxed);

    if request.method() == Method::OPTIONS {
        return finish(start, "none", preflight());
    }

    if request.uri().path() != TOKEN_PATH {
        return finish(start, "none", RelayError::NotFound.into_response());
    }

    if request.method() != Method::POST {
        return finish(start, "none", RelayError::MethodNotAllowed.into_response());
    }

    let token_request = match read_token_request(request, state.max_body_bytes).await {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, code = e.code(), "rejected token request");
            return finish(start, "none", e.into_response());
        }
    };

    let grant_type = token_request.grant_type().as_str();
    let response = match forward(state, &token_request).await {
        Ok(response) => response,
        Err(e) => {
            state.upstream_errors_total.fetch_add(1, Ordering::Relaxed);
            e.into_response()
        }
    };
    finish(start, grant_type, response)
}

/// Read the body and validate it as a token request. A body that cannot be
/// read (too large, aborted) is treated the same as malformed JSON.
async fn read_token_request(
    request: Request<Body>,
    max_body_bytes: usize,
) -> Result<TokenRequest, RelayError> {
    let body = axum::body::to_bytes(request.into_body(), max_body_bytes)
        .await
        .map_err(|e| {
            debug!(error = %e, "failed to read request body");
            RelayError::Grant(token_grant::GrantError::InvalidJson)
        })?;
    Ok(TokenRequest::from_json(&body)?)
}

/// POST the validated request to the token endpoint and relay the result.
///
/// The provider's status and body pass through untouched, including OAuth
/// error payloads such as `invalid_grant`.
pub async fn forward(
    state: &RelayState,
    token_request: &TokenRequest,
) -> Result<Response, RelayError> {
    let grant_type = token_request.grant_type().as_str();
    let form = upstream_form(token_request, &state.credentials);

    let upstream = state
        .client
        .post(&state.token_endpoint)
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            let error_type = classify_upstream_error(&e);
            metrics::record_upstream_error(error_type);
            error!(error = %e, error_type, grant_type, "token endpoint request failed");
            RelayError::UpstreamUnreachable(e.to_string())
        })?;

    let status = upstream.status();
    let body = upstream.bytes().await.map_err(|e| {
        metrics::record_upstream_error("body");
        error!(error = %e, grant_type, "failed to read token endpoint response body");
        RelayError::UpstreamUnreachable(e.to_string())
    })?;

    info!(status = status.as_u16(), grant_type, "relayed token endpoint response");
    Ok((status, relay_headers(), Body::from(body)).into_response())
}

fn classify_upstream_error(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_body() || e.is_decode() {
        "body"
    } else {
        "other"
    }
}

fn finish(start: Instant, grant_type: &'static str, response: Response) -> Response {
    metrics::record_request(
        response.status().as_u16(),
        grant_type,
        start.elapsed().as_secs_f64(),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_headers_are_the_fixed_four() {
        let headers = relay_headers();
        assert_eq!(headers.len(), 4);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "content-type");
    }

    #[tokio::test]
    async fn preflight_is_204_with_empty_body() {
        let resp = preflight();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["access-control-allow-methods"], "POST, OPTIONS");
        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn oversized_body_is_invalid_json() {
        let request = Request::builder()
            .method("POST")
            .uri(TOKEN_PATH)
            .body(Body::from(vec![b' '; 64]))
            .unwrap();
        let err = read_token_request(request, 16).await.unwrap_err();
        assert_eq!(err.code(), "invalid_json");
    }
}
