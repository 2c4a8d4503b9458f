//! Common types shared by the token and indexer clients
//!
//! This module contains type aliases, the ETL work message handed to
//! downstream processing, and small enums that travel inside documents.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Loosely typed JSON object, as returned by the token service
pub type Document = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// ETL Message
// ============================================================================

/// A unit of extraction work referencing a connection and one of its datasources.
///
/// Published on the message queue by the scheduler and consumed by the
/// extract/transform/persist workers. Only the shape lives here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EtlMessage {
    /// OSP the connection belongs to
    pub osp: String,
    /// Datasource to extract
    pub datasource: String,
    /// Connection document ID
    #[serde(rename = "connectionId")]
    pub connection_id: String,
    /// Company the connection extracts for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Indexer entry this work item belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Period covered by the extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Storage tag where extracted data lands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl EtlMessage {
    /// Create a message for a connection/datasource pair
    pub fn new(
        osp: impl Into<String>,
        datasource: impl Into<String>,
        connection_id: impl Into<String>,
    ) -> Self {
        Self {
            osp: osp.into(),
            datasource: datasource.into(),
            connection_id: connection_id.into(),
            ..Default::default()
        }
    }

    /// Set the company
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set the indexer entry
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the period
    #[must_use]
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    /// Set the storage tag
    #[must_use]
    pub fn with_storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    /// Encode as the JSON payload published on the queue
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a queue payload
    pub fn from_json(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

// ============================================================================
// Transaction Direction
// ============================================================================

/// Direction of a financial transaction, relative to the connected company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionDirection {
    /// Money coming into the company
    Inbound,
    /// Money leaving the company
    Outbound,
}

impl TransactionDirection {
    /// All directions, in code order
    pub const ALL: [TransactionDirection; 2] =
        [TransactionDirection::Inbound, TransactionDirection::Outbound];

    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionDirection::Inbound => "Inbound",
            TransactionDirection::Outbound => "Outbound",
        }
    }

    /// Numeric code (1-based)
    pub fn code(self) -> u8 {
        match self {
            TransactionDirection::Inbound => 1,
            TransactionDirection::Outbound => 2,
        }
    }

    /// Direction for a numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(TransactionDirection::Inbound),
            2 => Some(TransactionDirection::Outbound),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::validation(format!("{s} does not belong to TransactionDirection values"))
            })
    }
}

impl Serialize for TransactionDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

/// Deserialize a field, treating an explicit `null` like an absent key.
///
/// `#[serde(default)]` alone only covers the absent key; the services also
/// send `null` for empty strings.
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct Reply {
///     #[serde(default, deserialize_with = "null_as_default")]
///     message: String,
/// }
/// ```
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level used when initialising the subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-request tracing
    Trace,
    /// Request and response summaries
    Debug,
    /// Normal operation
    #[default]
    Info,
    /// Recoverable problems
    Warn,
    /// Failures only
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
