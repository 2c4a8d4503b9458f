//! Authentication module
//!
//! Both services authenticate callers with HTTP Basic auth built from a
//! client ID and secret.

mod types;

pub use types::Credentials;
