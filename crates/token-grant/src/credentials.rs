//! Server-held OAuth client credentials

use common::Secret;

/// The confidential client identity the relay presents to the provider.
///
/// Built once at startup and shared read-only across requests. `Debug`
/// prints the secret as `[REDACTED]`.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: Secret<String>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: Secret<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &Secret<String> {
        &self.client_secret
    }
}
