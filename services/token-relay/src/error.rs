//! Per-request relay errors
//!
//! Every variant renders as a JSON body `{"error": "<code>", ...}` carrying the
//! same header set as a relayed upstream response. Errors the provider itself
//! returns are not represented here; those are relayed verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use token_grant::GrantError;

use crate::relay::relay_headers;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("no route for path")]
    NotFound,

    #[error("method not allowed on token path")]
    MethodNotAllowed,

    #[error(transparent)]
    Grant(#[from] GrantError),

    #[error("upstream token endpoint unreachable: {0}")]
    UpstreamUnreachable(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Grant(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Wire error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::Grant(e) => e.code(),
            Self::UpstreamUnreachable(_) => "upstream_unreachable",
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::Grant(e) => e.body(),
            _ => serde_json::json!({ "error": self.code() }),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), relay_headers(), self.body().to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn routing_errors_render_code_only() {
        let resp = RelayError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, r#"{"error":"not_found"}"#);

        let resp = RelayError::MethodNotAllowed.into_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_string(resp).await, r#"{"error":"method_not_allowed"}"#);
    }

    #[tokio::test]
    async fn grant_errors_are_bad_request() {
        let resp = RelayError::from(GrantError::MissingFields {
            required: &["refresh_token"],
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(resp).await,
            r#"{"error":"missing_fields","required":["refresh_token"]}"#
        );
    }

    #[tokio::test]
    async fn upstream_unreachable_is_bad_gateway_without_detail() {
        let resp = RelayError::UpstreamUnreachable("dns error: no such host".into())
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(body_string(resp).await, r#"{"error":"upstream_unreachable"}"#);
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        assert!(
            RelayError::UpstreamUnreachable("connection refused".into())
                .to_string()
                .contains("connection refused")
        );
        assert_eq!(
            RelayError::Grant(GrantError::InvalidJson).to_string(),
            "request body is not valid JSON"
        );
    }
}
