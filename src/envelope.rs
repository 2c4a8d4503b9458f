//! Response envelope
//!
//! Every service response is shaped `{status, message, details}`. Decoding is
//! two-stage: the envelope is read with `details` kept as raw JSON, and only an
//! `"ok"` envelope has its `details` decoded into the caller's type. A failed
//! response's `details` are never looked at.

use crate::error::{Error, Result};
use crate::http::HttpResponse;
use crate::types::null_as_default;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Status value the services use for success
pub const STATUS_OK: &str = "ok";

/// Response envelope with undecoded details.
///
/// `status` and `message` read as empty when absent or `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Envelope {
    /// `"ok"` on success, anything else is a failure
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Human readable explanation, set on failures
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Operation payload, kept raw until the status is checked
    #[serde(default)]
    pub details: Value,
}

impl Envelope {
    /// Parse an envelope out of a response.
    ///
    /// A body that is not an envelope becomes `HttpStatus` for non-2xx
    /// responses and `Decode` otherwise.
    pub fn from_response(response: &HttpResponse) -> Result<Self> {
        match serde_json::from_slice::<Envelope>(&response.body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !response.is_success() => {
                Err(Error::http_status(response.status, response.text()))
            }
            Err(e) => Err(Error::decode(format!(
                "response is not a {{status, message, details}} envelope: {e}"
            ))),
        }
    }

    /// Whether the service reported success
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Fail with the service message unless the status is `"ok"`
    pub fn ensure_ok(self, service: &str) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(Error::service(service, self.message))
        }
    }

    /// Decode required details
    pub fn details<T: DeserializeOwned>(self) -> Result<T> {
        if self.details.is_null() {
            return Err(Error::decode("response carried no details"));
        }
        serde_json::from_value(self.details)
            .map_err(|e| Error::decode(format!("unexpected details shape: {e}")))
    }

    /// Decode details, treating absent or `null` as `None`
    pub fn optional_details<T: DeserializeOwned>(self) -> Result<Option<T>> {
        if self.details.is_null() {
            return Ok(None);
        }
        self.details().map(Some)
    }
}
