//! Logging setup
//!
//! The clients only emit `tracing` events. Binaries embedding them can call
//! [`init`] to install a formatted subscriber; `RUST_LOG` directives take
//! precedence over the configured level.

use crate::error::{Error, Result};
use crate::types::LogLevel;
use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber, failing if one is already set
pub fn try_init(level: LogLevel) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::from(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::config(format!("failed to install log subscriber: {e}")))
}

/// Install a global `fmt` subscriber, ignoring an already-installed one
pub fn init(level: LogLevel) {
    let _ = try_init(level);
}
