//! Client configuration structures
//!
//! Loaded by `moneybird_infra::config` from the environment or a JSON/TOML
//! file. Everything except the credentials has a default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_AUTHORIZE_URL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_SITE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_URL, DEFAULT_USER_AGENT,
};
use crate::errors::{MoneybirdError, Result};
use crate::types::ClientCredentials;

/// Full client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub credentials: ClientCredentials,
    #[serde(default)]
    pub endpoints: ApiEndpoints,
    #[serde(default)]
    pub transport: TransportSettings,
    /// JSON file the session is persisted to; in-memory when unset.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Configuration with default endpoints and transport settings.
    #[must_use]
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            endpoints: ApiEndpoints::default(),
            transport: TransportSettings::default(),
            session_file: None,
        }
    }

    /// # Errors
    /// Returns `MoneybirdError::Config` for blank credentials, endpoints or
    /// a zero timeout.
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;
        self.endpoints.validate()?;
        if self.transport.timeout_secs == 0 || self.transport.connect_timeout_secs == 0 {
            return Err(MoneybirdError::Config("timeouts must be at least one second".into()));
        }
        Ok(())
    }
}

/// Remote endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    /// Base that relative API paths are joined to.
    pub site_url: String,
    /// Versioned REST API root, e.g. `https://moneybird.com/api/`.
    pub api_url: String,
    pub version: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Endpoints rooted at a different host, keeping the default paths.
    ///
    /// Used for sandboxes and mock servers.
    #[must_use]
    pub fn for_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            site_url: host.to_string(),
            api_url: format!("{host}/api/"),
            version: DEFAULT_API_VERSION.to_string(),
            authorize_url: format!("{host}/oauth/authorize"),
            token_url: format!("{host}/oauth/token"),
        }
    }

    /// `{api_url}{version}`, without a trailing slash.
    #[must_use]
    pub fn versioned_root(&self) -> String {
        format!("{}{}", self.api_url, self.version).trim_end_matches('/').to_string()
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("site_url", &self.site_url),
            ("api_url", &self.api_url),
            ("version", &self.version),
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(MoneybirdError::Config(format!("endpoint `{name}` is empty")));
            }
        }
        Ok(())
    }
}

/// Default transport options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub verify_tls: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
        }
    }
}

impl TransportSettings {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> ClientCredentials {
        ClientCredentials::new("A", "B", None).unwrap()
    }

    #[test]
    fn defaults_point_at_production() {
        let config = ClientConfig::new(credentials());
        assert_eq!(config.endpoints.versioned_root(), "https://moneybird.com/api/v2");
        assert_eq!(config.transport.user_agent, "MoneybirdClient");
        assert_eq!(config.transport.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn host_override_keeps_paths() {
        let endpoints = ApiEndpoints::for_host("http://127.0.0.1:9000/");
        assert_eq!(endpoints.token_url, "http://127.0.0.1:9000/oauth/token");
        assert_eq!(endpoints.versioned_root(), "http://127.0.0.1:9000/api/v2");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ClientConfig::new(credentials());
        config.transport.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(MoneybirdError::Config(_))));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"credentials": {"client_id": "A", "client_secret": "B"},
                "transport": {"verify_tls": false}}"#,
        )
        .unwrap();
        assert!(!config.transport.verify_tls);
        assert_eq!(config.transport.connect_timeout_secs, 30);
        assert_eq!(config.endpoints, ApiEndpoints::default());
    }
}
