//! Token service client
//!
//! The token service owns OAuth-style connection documents: it creates and
//! removes them, refreshes their access tokens, records their status, and
//! kicks off extractions for them.

mod client;
mod types;

pub use client::TokenClient;
pub use types::{Connection, ConnectionStatus, GetConnectionsOptions};
