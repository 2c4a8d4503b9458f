//! Error types for the pipeline clients
//!
//! Every public operation returns `Result<T, Error>` where Error is defined here.
//! Variants are grouped by where the failure happens: before the call (local
//! validation), on the wire (transport), while reading the body (decode), or
//! in the remote service (application).

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// The main error type for the pipeline clients
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Configuration is present but unusable
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// A required configuration value is absent
    #[error("Missing required config field: {field}")]
    MissingConfigField {
        /// Name of the setting or environment variable
        field: String,
    },

    /// Configuration file is not valid YAML
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Local Validation Errors
    // ============================================================================
    /// A required argument is empty
    #[error("The field {field} is required")]
    MissingField {
        /// Argument or form field name
        field: String,
    },

    /// Arguments were rejected before sending
    #[error("Validation failed: {message}")]
    Validation {
        /// What is wrong
        message: String,
    },

    /// Connection status clients may not set
    #[error("Cannot set connection status to {requested}, only NOT_CONNECTED is allowed")]
    StatusNotAllowed {
        /// Wire name of the rejected status
        requested: String,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Transport failure: connect, timeout, TLS or body read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response whose body is not an envelope
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Service URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Decode Errors
    // ============================================================================
    /// JSON encoding or decoding of a message failed
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Response body or details had an unexpected shape
    #[error("Failed to decode response: {message}")]
    Decode {
        /// What could not be decoded
        message: String,
    },

    // ============================================================================
    // Service Errors
    // ============================================================================
    /// Service answered with a status other than `"ok"`
    #[error("Non-OK response received from {service} service: {message}")]
    Service {
        /// Service name
        service: String,
        /// Message the service sent
        message: String,
    },

    // ============================================================================
    // Indexer Payload Errors
    // ============================================================================
    /// A field of an index record is missing or malformed
    #[error("Malformed field '{field}': {message}")]
    MalformedField {
        /// Field at fault
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// One or more rolling index elements could not be decoded
    #[error(
        "{} rolling index entries could not be decoded: {}",
        EntryList(.failures).entries(),
        EntryList(.failures)
    )]
    RollingEntries {
        /// Every bad field, in payload order
        failures: Vec<EntryFailure>,
    },
}

/// A single rolling index element that failed to decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// Position of the element in the payload array
    pub position: usize,
    /// Field that was missing or malformed
    pub field: String,
    /// What was wrong with it
    pub message: String,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.position, self.field, self.message)
    }
}

struct EntryList<'a>(&'a [EntryFailure]);

impl EntryList<'_> {
    /// Number of distinct elements among the failures
    fn entries(&self) -> usize {
        self.0
            .iter()
            .map(|f| f.position)
            .collect::<HashSet<_>>()
            .len()
    }
}

impl fmt::Display for EntryList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing config field error
    pub fn missing_config_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a service error
    pub fn service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a malformed field error
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised locally, before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. } | Error::Validation { .. } | Error::StatusNotAllowed { .. }
        )
    }
}

/// Result type alias for the pipeline clients
pub type Result<T> = std::result::Result<T, Error>;
