//! Inbound token request parsing and validation
//!
//! Validation order (first failure wins):
//! 1. body must be JSON
//! 2. `grant_type` must be `authorization_code` or `refresh_token`
//! 3. every field the grant type requires must be present and non-empty
//!
//! String, number and bool values are taken in their string form (`123` is
//! forwarded as `"123"`). Null, `""`, arrays and objects count as absent.
//!
//! Fields other than the ones the grant type requires are ignored and never
//! forwarded.

use common::Secret;
use serde_json::{Map, Value};

use crate::constants::{AUTHORIZATION_CODE_FIELDS, REFRESH_TOKEN_FIELDS};
use crate::error::GrantError;

/// OAuth flow variant being exchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

impl GrantType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Field names this grant type requires, in wire order.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::AuthorizationCode => AUTHORIZATION_CODE_FIELDS,
            Self::RefreshToken => REFRESH_TOKEN_FIELDS,
        }
    }
}

/// A validated token request. Holding one means every required field is
/// present and non-empty.
#[derive(Debug, Clone)]
pub enum TokenRequest {
    AuthorizationCode {
        code: Secret<String>,
        redirect_uri: String,
        code_verifier: Secret<String>,
    },
    RefreshToken {
        refresh_token: Secret<String>,
    },
}

impl TokenRequest {
    /// Parse and validate a raw request body.
    pub fn from_json(body: &[u8]) -> Result<Self, GrantError> {
        let payload: Value = serde_json::from_slice(body).map_err(|_| GrantError::InvalidJson)?;
        Self::from_value(&payload)
    }

    /// Validate an already-parsed JSON document. Non-object documents have no
    /// `grant_type` and are rejected as unsupported.
    pub fn from_value(payload: &Value) -> Result<Self, GrantError> {
        let Some(object) = payload.as_object() else {
            return Err(GrantError::UnsupportedGrantType);
        };

        let grant_type = non_empty(object, "grant_type")
            .as_deref()
            .and_then(GrantType::parse)
            .ok_or(GrantError::UnsupportedGrantType)?;

        let missing = || GrantError::MissingFields {
            required: grant_type.required_fields(),
        };

        match grant_type {
            GrantType::AuthorizationCode => {
                let code = non_empty(object, "code");
                let redirect_uri = non_empty(object, "redirect_uri");
                let code_verifier = non_empty(object, "code_verifier");
                match (code, redirect_uri, code_verifier) {
                    (Some(code), Some(redirect_uri), Some(code_verifier)) => {
                        Ok(Self::AuthorizationCode {
                            code: Secret::new(code),
                            redirect_uri,
                            code_verifier: Secret::new(code_verifier),
                        })
                    }
                    _ => Err(missing()),
                }
            }
            GrantType::RefreshToken => {
                let refresh_token = non_empty(object, "refresh_token").ok_or_else(missing)?;
                Ok(Self::RefreshToken {
                    refresh_token: Secret::new(refresh_token),
                })
            }
        }
    }

    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
        }
    }

    /// Grant-specific form fields, in the same order as `required_fields()`.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::AuthorizationCode {
                code,
                redirect_uri,
                code_verifier,
            } => vec![
                ("code", code.expose().as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("code_verifier", code_verifier.expose().as_str()),
            ],
            Self::RefreshToken { refresh_token } => {
                vec![("refresh_token", refresh_token.expose().as_str())]
            }
        }
    }
}

/// String form of a field, `None` when absent, null, empty or structured.
fn non_empty(object: &Map<String, Value>, key: &str) -> Option<String> {
    let value = match object.get(key)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!value.is_empty()).then_some(value)
}
