//! Indexer service client

use super::decode::decode_datasource;
use super::types::{IndexUpdate, IndexerDatasource, IndexerIndex};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::service::ServiceClient;
use crate::types::JsonValue;
use reqwest::Method;
use tracing::error;

const SERVICE: &str = "indexer";

/// Client for the indexer service.
///
/// The configured URL is the index collection itself: new indexes are posted
/// to it and existing ones live at `{url}/{connection}/{datasource}`.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    service: ServiceClient,
}

impl IndexerClient {
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

    /// Create a new index for a connection and datasource, returning the new
    /// tracking record
    pub async fn new_index(&self, index: &IndexerIndex) -> Result<IndexerDatasource> {
        let details: Option<JsonValue> = self
            .service
            .fetch_optional(Method::POST, &[], RequestConfig::new().form(index.to_form()))
            .await?;

        self.decode(details, &index.connection, &index.datasource)
    }

    /// Get the tracking record of a datasource for one cycle
    pub async fn get_index(
        &self,
        connection: &str,
        datasource: &str,
        cycle: &str,
    ) -> Result<IndexerDatasource> {
        let details: Option<JsonValue> = self
            .service
            .fetch_optional(
                Method::GET,
                &[connection, datasource],
                RequestConfig::new().query("cycle", cycle),
            )
            .await?;

        self.decode(details, connection, datasource)
    }

    /// Record the outcome of processing one index entry
    pub async fn update_index(
        &self,
        connection: &str,
        datasource: &str,
        cycle: &str,
        update: &IndexUpdate,
    ) -> Result<()> {
        self.service
            .call(
                Method::PUT,
                &[connection, datasource],
                RequestConfig::new()
                    .query("cycle", cycle)
                    .query("index", update.index.as_str())
                    .form(update.to_form()),
            )
            .await
    }

    fn decode(
        &self,
        details: Option<JsonValue>,
        connection: &str,
        datasource: &str,
    ) -> Result<IndexerDatasource> {
        details
            .ok_or_else(|| Error::decode("response carried no details"))
            .and_then(decode_datasource)
            .inspect_err(|e| {
                error!(
                    "Failed to decode index of {}/{} from the {} service: {}",
                    connection,
                    datasource,
                    self.service.name(),
                    e
                );
            })
    }
}
