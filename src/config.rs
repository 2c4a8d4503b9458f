//! Client configuration
//!
//! Service endpoints and credentials, loadable from YAML or the environment.
//!
//! ```yaml
//! token:
//!   url: https://token.internal/api
//!   client_id: scheduler
//!   client_secret: s3cret
//! indexer:
//!   url: https://indexer.internal/indexes
//!   client_id: scheduler
//!   client_secret: s3cret
//! http:
//!   timeout_secs: 10
//! log_level: debug
//! ```

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::indexer::IndexerClient;
use crate::token::TokenClient;
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Service Config
// ============================================================================

/// Where a service lives and how to authenticate against it
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the service
    pub url: String,
    /// Client ID
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
}

impl ServiceConfig {
    /// Create a service config
    pub fn new(
        url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read `{PREFIX}_URL`, `{PREFIX}_CLIENT_ID` and `{PREFIX}_CLIENT_SECRET`
    pub fn from_env(prefix: &str) -> Result<Self> {
        let var = |suffix: &str| {
            let name = format!("{prefix}_{suffix}");
            std::env::var(&name).map_err(|_| Error::missing_config_field(name))
        };

        let config = Self {
            url: var("URL")?,
            client_id: var("CLIENT_ID")?,
            client_secret: var("CLIENT_SECRET")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the URL is present and parseable
    pub fn validate(&self) -> Result<()> {
        self.parse_url().map(|_| ())
    }

    /// Parse the base URL
    pub fn parse_url(&self) -> Result<Url> {
        if self.url.trim().is_empty() {
            return Err(Error::missing_config_field("url"));
        }
        let url = Url::parse(&self.url)?;
        if url.cannot_be_a_base() {
            return Err(Error::config(format!("{} cannot be used as a base URL", self.url)));
        }
        Ok(url)
    }

    /// Basic auth credentials
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.client_id, &self.client_secret)
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// Transport settings shared by both clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Override the user agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl HttpSettings {
    /// Convert to an HTTP client config
    pub fn to_client_config(&self) -> HttpClientConfig {
        let mut builder =
            HttpClientConfig::builder().timeout(Duration::from_secs(self.timeout_secs));
        if let Some(ref agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Configuration for both service clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientsConfig {
    /// Token service
    #[serde(default)]
    pub token: Option<ServiceConfig>,
    /// Indexer service
    #[serde(default)]
    pub indexer: Option<ServiceConfig>,
    /// Transport settings
    #[serde(default)]
    pub http: HttpSettings,
    /// Log level for `logging::init`
    #[serde(default)]
    pub log_level: LogLevel,
}

impl ClientsConfig {
    /// Parse from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_yaml_str(&contents)
    }

    /// Validate every configured service
    pub fn validate(&self) -> Result<()> {
        for service in [&self.token, &self.indexer].into_iter().flatten() {
            service.validate()?;
        }
        Ok(())
    }

    /// HTTP client built from the transport settings
    pub fn http_client(&self) -> Result<HttpClient> {
        HttpClient::with_config(self.http.to_client_config())
    }

    /// Token service client
    pub fn token_client(&self) -> Result<TokenClient> {
        let service = self
            .token
            .as_ref()
            .ok_or_else(|| Error::missing_config_field("token"))?;
        TokenClient::with_http(service, self.http_client()?)
    }

    /// Indexer service client
    pub fn indexer_client(&self) -> Result<IndexerClient> {
        let service = self
            .indexer
            .as_ref()
            .ok_or_else(|| Error::missing_config_field("indexer"))?;
        IndexerClient::with_http(service, self.http_client()?)
    }
}
