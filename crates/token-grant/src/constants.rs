//! OAuth constants

/// Google's token endpoint for code exchange and token refresh
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Environment variable carrying the OAuth client identifier
pub const CLIENT_ID_ENV: &str = "GOOGLE_CLIENT_ID";

/// Environment variable carrying the OAuth client secret
pub const CLIENT_SECRET_ENV: &str = "GOOGLE_CLIENT_SECRET";

/// Fields an `authorization_code` request must carry, in the order they are
/// reported back to the client and forwarded upstream.
pub const AUTHORIZATION_CODE_FIELDS: &[&str] = &["code", "redirect_uri", "code_verifier"];

/// Fields a `refresh_token` request must carry.
pub const REFRESH_TOKEN_FIELDS: &[&str] = &["refresh_token"];
