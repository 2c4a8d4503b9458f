//! Token service types

use crate::error::{Error, Result};
use crate::types::{Document, JsonValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a connection document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    /// Connected and extracting
    Active,
    /// Disconnected, by the user or because the provider revoked access
    NotConnected,
    /// Created but not yet authorised
    New,
}

impl ConnectionStatus {
    /// Wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Active => "ACTIVE",
            ConnectionStatus::NotConnected => "NOT_CONNECTED",
            ConnectionStatus::New => "NEW",
        }
    }

    /// Whether clients may move a connection into this status.
    ///
    /// Only disconnecting is allowed; the token service drives every other
    /// transition itself.
    pub fn is_settable(self) -> bool {
        matches!(self, ConnectionStatus::NotConnected)
    }

    /// Fail with `StatusNotAllowed` unless clients may set this status
    pub fn ensure_settable(self) -> Result<Self> {
        if self.is_settable() {
            Ok(self)
        } else {
            Err(Error::StatusNotAllowed {
                requested: self.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(ConnectionStatus::Active),
            "NOT_CONNECTED" => Ok(ConnectionStatus::NotConnected),
            "NEW" => Ok(ConnectionStatus::New),
            other => Err(Error::validation(format!(
                "unknown connection status '{other}'"
            ))),
        }
    }
}

/// A connection document.
///
/// Fields are defined by each OSP and by the token service, so the document
/// is kept loosely typed with accessors for the fields every connection has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Connection(Document);

impl Connection {
    /// Wrap a raw document
    pub fn from_document(document: Document) -> Self {
        Self(document)
    }

    /// Connection ID (`id`, or `_id` as stored)
    pub fn id(&self) -> Option<&str> {
        self.str_field("id").or_else(|| self.str_field("_id"))
    }

    /// OSP the connection belongs to
    pub fn osp(&self) -> Option<&str> {
        self.str_field("osp")
    }

    /// Parsed status, if present and recognised
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.str_field("status").and_then(|s| s.parse().ok())
    }

    /// Any field
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// The underlying document
    pub fn document(&self) -> &Document {
        &self.0
    }

    /// Take the underlying document
    pub fn into_document(self) -> Document {
        self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(JsonValue::as_str)
    }
}

impl From<Document> for Connection {
    fn from(document: Document) -> Self {
        Self(document)
    }
}

/// Options for listing connections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetConnectionsOptions {
    /// Predicate the service matches documents against
    pub filter: Document,
    /// Fields to include in each document (defaults to `osp`)
    pub selector: Vec<String>,
    /// Maximum number of documents
    pub limit: u32,
    /// Number of documents to skip
    pub offset: u32,
}

impl GetConnectionsOptions {
    /// Options matching every connection, selecting `osp`
    pub fn new() -> Self {
        Self::default()
    }

    /// Match documents where `key` equals `value`
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }

    /// Include a field in the returned documents
    #[must_use]
    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.selector.push(field.into());
        self
    }

    /// Cap the number of documents returned
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Skip the first `offset` documents
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Query parameters in wire order
    pub(crate) fn to_query(&self) -> Result<Vec<(String, String)>> {
        let filter = serde_json::to_string(&self.filter)?;
        let selector = if self.selector.is_empty() {
            "osp".to_string()
        } else {
            self.selector.join(",")
        };

        Ok(vec![
            ("filter".to_string(), filter),
            ("selector".to_string(), selector),
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ])
    }
}
