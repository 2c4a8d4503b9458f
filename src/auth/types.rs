//! Client credentials

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client ID and secret issued by a pipeline service
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Client ID (Basic auth username)
    pub client_id: String,
    /// Client secret (Basic auth password)
    pub client_secret: String,
}

impl Credentials {
    /// Create credentials from an ID/secret pair
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Apply Basic authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(&self.client_id, Some(&self.client_secret))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
