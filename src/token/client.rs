//! Token service client
//!
//! Each method performs exactly one request against the token service.
//! Arguments that the service would reject are checked locally first, so a
//! validation error always means nothing was sent.

use super::types::{Connection, ConnectionStatus, GetConnectionsOptions};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::service::ServiceClient;
use crate::types::{Document, StringMap};
use reqwest::Method;
use std::collections::BTreeMap;
use tracing::debug;

const SERVICE: &str = "token";

/// Client for the token service
#[derive(Debug, Clone)]
pub struct TokenClient {
    service: ServiceClient,
}

impl TokenClient {
    /// Create a client with a default HTTP client
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Self::with_http(config, HttpClient::new()?)
    }

    /// Create a client sharing an existing HTTP client
    pub fn with_http(config: &ServiceConfig, http: HttpClient) -> Result<Self> {
        Ok(Self {
            service: ServiceClient::new(SERVICE, config, http)?,
        })
    }

    /// Ask the token service to start an ETL run for a connection
    pub async fn initiate_etl(&self, id: &str) -> Result<()> {
        self.service
            .call(
                Method::GET,
                &["connections", id],
                RequestConfig::new().query("action", "etl"),
            )
            .await
    }

    /// Get a connection by ID
    pub async fn get_connection(&self, id: &str) -> Result<Connection> {
        self.fetch_connection(id, false).await
    }

    /// Get a connection by ID, refreshing its access token first if necessary
    pub async fn get_connection_with_refresh(&self, id: &str) -> Result<Connection> {
        self.fetch_connection(id, true).await
    }

    async fn fetch_connection(&self, id: &str, refresh: bool) -> Result<Connection> {
        let mut request = RequestConfig::new();
        if refresh {
            request = request.query("action", "refresh");
        }
        self.service
            .fetch(Method::GET, &["connections", id], request)
            .await
    }

    /// List connections matching a filter.
    ///
    /// `selector` restricts the fields returned per document; `limit` and
    /// `offset` page through the results.
    pub async fn get_connections(&self, opts: &GetConnectionsOptions) -> Result<Vec<Connection>> {
        let query = opts.to_query()?;
        debug!("Listing connections with {:?}", query);

        let connections = self
            .service
            .fetch_optional(
                Method::GET,
                &["connections"],
                RequestConfig::new().queries(query),
            )
            .await?;
        Ok(connections.unwrap_or_default())
    }

    /// Get an OSP definition by name
    pub async fn get_osp(&self, osp: &str) -> Result<Document> {
        self.service
            .fetch(Method::GET, &["osp", osp], RequestConfig::new())
            .await
    }

    /// Set the status of a connection. Only `NotConnected` is accepted.
    pub async fn set_connection_status(
        &self,
        id: &str,
        status: ConnectionStatus,
        reason: &str,
    ) -> Result<()> {
        let status = status.ensure_settable()?;

        self.service
            .call(
                Method::POST,
                &["connections", id, "status"],
                RequestConfig::new().form([("status", status.as_str()), ("reason", reason)]),
            )
            .await
    }

    /// Replace the settings of a connection
    pub async fn set_connection_setting(&self, id: &str, settings: &Document) -> Result<()> {
        if settings.is_empty() {
            return Err(Error::validation("the new settings provided are empty"));
        }

        self.service
            .call(
                Method::POST,
                &["connections", id, "settings"],
                RequestConfig::new().json(serde_json::Value::Object(settings.clone())),
            )
            .await
    }

    /// Create a new connection. The form must carry non-empty `osp` and `user`.
    pub async fn create_connection(&self, form: &StringMap) -> Result<Connection> {
        for field in ["osp", "user"] {
            if form.get(field).map_or(true, String::is_empty) {
                return Err(Error::missing_field(field));
            }
        }

        let fields: BTreeMap<&str, &str> = form
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        self.service
            .fetch(
                Method::POST,
                &["connections"],
                RequestConfig::new().form(fields),
            )
            .await
    }

    /// Remove a connection
    pub async fn remove_connection(&self, id: &str) -> Result<()> {
        self.service
            .call(Method::DELETE, &["connections", id], RequestConfig::new())
            .await
    }

    /// Ask the service to perform an action on a connection.
    ///
    /// `params` are sent alongside `action`; a param named `action` wins.
    pub async fn manage_connection(
        &self,
        id: &str,
        action: &str,
        params: &StringMap,
    ) -> Result<()> {
        if action.is_empty() {
            return Err(Error::missing_field("action"));
        }

        let mut query: BTreeMap<&str, &str> = BTreeMap::new();
        query.insert("action", action);
        query.extend(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        self.service
            .call(
                Method::GET,
                &["connections", id],
                RequestConfig::new().queries(query),
            )
            .await
    }

    /// Trigger an extraction for a connection.
    ///
    /// `opts` become query parameters, e.g. the extraction type.
    pub async fn trigger_extraction(&self, id: &str, opts: &StringMap) -> Result<()> {
        let query: BTreeMap<&str, &str> = opts
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        debug!("Triggering extraction for {} with {:?}", id, query);

        self.service
            .call(
                Method::PUT,
                &["connections", id, "extract"],
                RequestConfig::new().queries(query),
            )
            .await
    }
}
