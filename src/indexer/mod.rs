//! Indexer service client
//!
//! The indexer tracks extraction progress per connection, datasource and
//! cycle. A datasource is indexed in one of two modes:
//!
//! - **absolute**: one current record with an expiry
//! - **rolling**: an ordered list of per-period records
//!
//! The service returns either shape under the same `{type, data}` payload;
//! [`decode_datasource`] turns it into an [`IndexerDatasource`].

mod client;
mod decode;
mod types;

pub use client::IndexerClient;
pub use decode::decode_datasource;
pub use types::{
    AbsoluteRecord, IndexType, IndexUpdate, IndexerDatasource, IndexerIndex, RollingRecord,
};

#[cfg(test)]
mod tests;
