//! Indexer types

use crate::error::{Error, Result};
use crate::types::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tracking mode of a datasource index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// One current record
    Absolute,
    /// One record per period
    Rolling,
}

impl IndexType {
    /// Wire name of the index type
    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::Absolute => "absolute",
            IndexType::Rolling => "rolling",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "absolute" => Ok(IndexType::Absolute),
            "rolling" => Ok(IndexType::Rolling),
            other => Err(Error::validation(format!("unknown index type '{other}'"))),
        }
    }
}

/// Request to start tracking a datasource for one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerIndex {
    /// Connection ID
    pub connection: String,
    /// Datasource name
    pub datasource: String,
    /// Number of periods to track
    pub count: u32,
    /// Tracking mode
    #[serde(rename = "type")]
    pub index_type: IndexType,
    /// Storage tag where extracted data lands
    pub storage: String,
    /// Extraction cycle identifier
    pub cycle: String,
}

impl IndexerIndex {
    /// Track one period of a datasource, without a storage tag
    pub fn new(
        connection: impl Into<String>,
        datasource: impl Into<String>,
        index_type: IndexType,
        cycle: impl Into<String>,
    ) -> Self {
        Self {
            connection: connection.into(),
            datasource: datasource.into(),
            count: 1,
            index_type,
            storage: String::new(),
            cycle: cycle.into(),
        }
    }

    /// Number of periods to track
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Storage tag where extracted data lands
    #[must_use]
    pub fn with_storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = storage.into();
        self
    }

    /// Form fields in wire order
    pub(crate) fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("connection", self.connection.clone()),
            ("datasource", self.datasource.clone()),
            ("count", self.count.to_string()),
            ("type", self.index_type.as_str().to_string()),
            ("storage", self.storage.clone()),
            ("cycle", self.cycle.clone()),
        ]
    }
}

/// Current state of an absolute index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteRecord {
    /// Processing status of the index
    pub status: String,
    /// Whether the last run should be retried
    pub retry: bool,
    /// Last change
    pub updated: DateTime<Utc>,
    /// Outcome of the last run, empty when the service sent none
    #[serde(default, deserialize_with = "null_as_default")]
    pub outcome: String,
    /// Index entry identifier
    pub index: String,
    /// When the record stops being current
    pub expires: DateTime<Utc>,
}

/// State of one period of a rolling index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingRecord {
    /// Index entry identifier
    pub index: String,
    /// Period the entry covers
    pub period: String,
    /// Outcome of the last run
    pub outcome: String,
    /// Whether the last run should be retried
    pub retry: bool,
    /// Processing status of the entry
    pub status: String,
    /// Last change
    pub updated: DateTime<Utc>,
}

/// A datasource's tracking record, shaped by its index type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum IndexerDatasource {
    /// Single current record
    Absolute(AbsoluteRecord),
    /// One record per period, in service order
    Rolling(Vec<RollingRecord>),
}

impl IndexerDatasource {
    /// Index type of the payload
    pub fn index_type(&self) -> IndexType {
        match self {
            IndexerDatasource::Absolute(_) => IndexType::Absolute,
            IndexerDatasource::Rolling(_) => IndexType::Rolling,
        }
    }

    /// The absolute record, if this is one
    pub fn as_absolute(&self) -> Option<&AbsoluteRecord> {
        match self {
            IndexerDatasource::Absolute(record) => Some(record),
            IndexerDatasource::Rolling(_) => None,
        }
    }

    /// The rolling records, if this is a rolling index
    pub fn as_rolling(&self) -> Option<&[RollingRecord]> {
        match self {
            IndexerDatasource::Rolling(records) => Some(records.as_slice()),
            IndexerDatasource::Absolute(_) => None,
        }
    }
}

/// Outcome of processing one index entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexUpdate {
    /// Index entry identifier
    pub index: String,
    /// Free-form outcome description
    pub outcome: String,
    /// Whether processing succeeded
    pub ok: bool,
    /// Whether the entry should be retried
    pub retry: bool,
}

impl IndexUpdate {
    /// A successful update
    pub fn new(index: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            outcome: outcome.into(),
            ok: true,
            retry: false,
        }
    }

    /// Mark the update as failed
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.ok = false;
        self
    }

    /// Ask for the entry to be retried
    #[must_use]
    pub fn retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Status as sent on the wire: `ok` or `err`
    pub fn status(&self) -> &'static str {
        if self.ok {
            "ok"
        } else {
            "err"
        }
    }

    /// Form fields in wire order
    pub(crate) fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("outcome", self.outcome.clone()),
            ("status", self.status().to_string()),
            ("retry", self.retry.to_string()),
        ]
    }
}
