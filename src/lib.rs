//! # Pipeline Clients
//!
//! Client libraries for the internal services of the extraction pipeline.
//!
//! - **Token service**: connection documents (create, read, refresh, remove,
//!   status and settings) and extraction triggers
//! - **Indexer service**: extraction cycle progress per connection and
//!   datasource, in absolute or rolling mode
//! - **Shared types**: the ETL work message handed to downstream workers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pipeline_clients::{ClientsConfig, IndexType, IndexerIndex, Result};
//!
//! async fn run() -> Result<()> {
//!     let config = ClientsConfig::from_file("clients.yaml")?;
//!
//!     let token = config.token_client()?;
//!     let conn = token.get_connection_with_refresh("5f1c").await?;
//!
//!     let indexer = config.indexer_client()?;
//!     let index = IndexerIndex::new("5f1c", "invoices", IndexType::Rolling, "2024-05");
//!     let record = indexer.new_index(&index).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Wire contract
//!
//! Every call is one HTTP exchange with Basic authentication. Responses are
//! `{status, message, details}` envelopes; anything but `status: "ok"` is an
//! [`Error::Service`] carrying the service's message.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client credentials
pub mod auth;

/// HTTP request helper
pub mod http;

/// Response envelope decoding
pub mod envelope;

/// Shared service plumbing
pub mod service;

/// Token service client
pub mod token;

/// Indexer service client
pub mod indexer;

/// Client configuration
pub mod config;

/// Log subscriber setup
pub mod logging;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ClientsConfig, ServiceConfig};
pub use error::{Error, Result};
pub use indexer::{
    AbsoluteRecord, IndexType, IndexUpdate, IndexerClient, IndexerDatasource, IndexerIndex,
    RollingRecord,
};
pub use token::{Connection, ConnectionStatus, GetConnectionsOptions, TokenClient};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
