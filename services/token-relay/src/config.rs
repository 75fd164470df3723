//! Configuration types and loading
//!
//! Config precedence: CLI `--config` > CONFIG_PATH env var > built-in defaults.
//! The OAuth client id and secret come from GOOGLE_CLIENT_ID /
//! GOOGLE_CLIENT_SECRET or from mounted files, never from the TOML itself.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use token_grant::{CLIENT_ID_ENV, CLIENT_SECRET_ENV, ClientCredentials, GOOGLE_TOKEN_ENDPOINT};

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Public relay listener and upstream settings
#[derive(Debug, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            token_endpoint: default_token_endpoint(),
            max_connections: default_max_connections(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Ops listener for /health and /metrics. Disabled unless `listen_addr` is set.
#[derive(Debug, Default, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub listen_addr: Option<SocketAddr>,
}

/// Where to find the OAuth client credentials
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub client_id_file: Option<PathBuf>,
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(skip)]
    pub client_id: Option<Secret<String>>,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8787))
}

fn default_token_endpoint() -> String {
    GOOGLE_TOKEN_ENDPOINT.to_string()
}

fn default_max_connections() -> usize {
    1000
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Config {
    /// Load configuration from an optional TOML file, then resolve the client
    /// credentials.
    ///
    /// Credential resolution order, per value:
    /// 1. GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET env var
    /// 2. client_id_file / client_secret_file path from config
    pub fn load(path: Option<&Path>) -> common::Result<Self> {
        let mut config: Config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            None => Config::default(),
        };

        if !config.relay.token_endpoint.starts_with("http://")
            && !config.relay.token_endpoint.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "token_endpoint must start with http:// or https://, got: {}",
                config.relay.token_endpoint
            )));
        }

        if config.relay.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if config.relay.max_body_bytes == 0 {
            return Err(common::Error::Config(
                "max_body_bytes must be greater than 0".into(),
            ));
        }

        let creds = &mut config.credentials;
        creds.client_id = resolve_credential(CLIENT_ID_ENV, creds.client_id_file.as_deref())?;
        creds.client_secret =
            resolve_credential(CLIENT_SECRET_ENV, creds.client_secret_file.as_deref())?;

        if creds.client_id.is_none() {
            return Err(common::Error::MissingCredential(CLIENT_ID_ENV));
        }
        if creds.client_secret.is_none() {
            return Err(common::Error::MissingCredential(CLIENT_SECRET_ENV));
        }

        Ok(config)
    }

    /// The resolved client credentials. Fails only for a `Config` that did
    /// not come from `load()`.
    pub fn client_credentials(&self) -> common::Result<ClientCredentials> {
        let id = self
            .credentials
            .client_id
            .as_ref()
            .ok_or(common::Error::MissingCredential(CLIENT_ID_ENV))?;
        let secret = self
            .credentials
            .client_secret
            .clone()
            .ok_or(common::Error::MissingCredential(CLIENT_SECRET_ENV))?;
        Ok(ClientCredentials::new(id.expose().clone(), secret))
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var. `None`
    /// means run on defaults.
    pub fn resolve_path(cli_path: Option<&str>) -> Option<PathBuf> {
        if let Some(p) = cli_path {
            return Some(PathBuf::from(p));
        }
        std::env::var("CONFIG_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

fn resolve_credential(env: &str, file: Option<&Path>) -> common::Result<Option<Secret<String>>> {
    if let Some(value) = Secret::from_env(env) {
        return Ok(Some(value));
    }
    match file {
        Some(path) => Secret::from_file(path),
        None => Ok(None),
    }
}
