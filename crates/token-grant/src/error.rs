//! Token request validation errors

use serde_json::{Value, json};

/// Why an inbound token request was rejected before any upstream call.
///
/// Each variant maps to one wire error code; the HTTP layer always answers
/// these with 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrantError {
    #[error("request body is not valid JSON")]
    InvalidJson,

    #[error("grant_type must be authorization_code or refresh_token")]
    UnsupportedGrantType,

    #[error("missing required fields: {}", required.join(", "))]
    MissingFields { required: &'static [&'static str] },
}

impl GrantError {
    /// Wire error code placed in the `error` member of the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::MissingFields { .. } => "missing_fields",
        }
    }

    /// The full required field set for `MissingFields`, `None` otherwise.
    pub fn required(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::MissingFields { required } => Some(*required),
            _ => None,
        }
    }

    /// JSON response body, e.g. `{"error":"missing_fields","required":["refresh_token"]}`.
    pub fn body(&self) -> Value {
        match self.required() {
            Some(required) => json!({ "error": self.code(), "required": required }),
            None => json!({ "error": self.code() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AUTHORIZATION_CODE_FIELDS;

    #[test]
    fn simple_errors_have_no_required_member() {
        assert_eq!(
            GrantError::InvalidJson.body(),
            json!({ "error": "invalid_json" })
        );
        assert_eq!(
            GrantError::UnsupportedGrantType.body(),
            json!({ "error": "unsupported_grant_type" })
        );
    }

    #[test]
    fn missing_fields_body_lists_required_set_in_order() {
        let err = GrantError::MissingFields {
            required: AUTHORIZATION_CODE_FIELDS,
        };
        assert_eq!(
            err.body().to_string(),
            r#"{"error":"missing_fields","required":["code","redirect_uri","code_verifier"]}"#
        );
    }

    #[test]
    fn display_names_fields() {
        let err = GrantError::MissingFields {
            required: &["refresh_token"],
        };
        assert_eq!(err.to_string(), "missing required fields: refresh_token");
    }
}
