//! OAuth token grant handling
//!
//! Turns an inbound JSON token request into the form fields the identity
//! provider's token endpoint expects. This crate has no HTTP server or client
//! dependency so validation can be tested in isolation.
//!
//! Flow:
//! 1. `TokenRequest::from_json()` validates the body per grant type
//! 2. `form::upstream_form()` merges it with the server-held `ClientCredentials`
//! 3. The caller POSTs the pairs form-encoded to `GOOGLE_TOKEN_ENDPOINT`

pub mod constants;
pub mod credentials;
pub mod error;
pub mod form;
pub mod request;

pub use constants::*;
pub use credentials::ClientCredentials;
pub use error::GrantError;
pub use form::upstream_form;
pub use request::{GrantType, TokenRequest};
