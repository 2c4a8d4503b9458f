//! Datasource payload decoding
//!
//! The `type` tag picks the variant and `data` is parsed straight into the
//! variant's record type. When that parse fails, the element is checked field
//! by field so every failure names the field at fault. Rolling payloads are
//! decoded in full: either every element succeeds or the call fails with the
//! list of element failures. There are no partial results.

use super::types::{AbsoluteRecord, IndexType, IndexerDatasource, RollingRecord};
use crate::error::{EntryFailure, Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct RawDatasource {
    #[serde(rename = "type")]
    index_type: IndexType,
    #[serde(default)]
    data: JsonValue,
}

/// Decode the `details` of an indexer response
pub fn decode_datasource(details: JsonValue) -> Result<IndexerDatasource> {
    let raw: RawDatasource = serde_json::from_value(details)
        .map_err(|e| Error::decode(format!("invalid datasource payload: {e}")))?;

    match raw.index_type {
        IndexType::Absolute => decode_absolute(&raw.data).map(IndexerDatasource::Absolute),
        IndexType::Rolling => decode_rolling(&raw.data).map(IndexerDatasource::Rolling),
    }
}

fn decode_absolute(data: &JsonValue) -> Result<AbsoluteRecord> {
    AbsoluteRecord::deserialize(data).map_err(|e| {
        diagnose(data, "data", ABSOLUTE_FIELDS, &e)
            .into_iter()
            .next()
            .map_or_else(|| Error::decode(e.to_string()), FieldError::into_error)
    })
}

fn decode_rolling(data: &JsonValue) -> Result<Vec<RollingRecord>> {
    let entries = data
        .as_array()
        .ok_or_else(|| Error::malformed("data", format!("expected an array, got {}", kind(data))))?;

    let mut records = Vec::with_capacity(entries.len());
    let mut failures = Vec::new();

    for (position, entry) in entries.iter().enumerate() {
        match RollingRecord::deserialize(entry) {
            Ok(record) => records.push(record),
            Err(e) => failures.extend(
                diagnose(entry, "entry", ROLLING_FIELDS, &e)
                    .into_iter()
                    .map(|f| EntryFailure {
                        position,
                        field: f.field.to_string(),
                        message: f.message,
                    }),
            ),
        }
    }

    if failures.is_empty() {
        Ok(records)
    } else {
        Err(Error::RollingEntries { failures })
    }
}

// ============================================================================
// Field diagnosis
// ============================================================================

/// What a record field must hold
#[derive(Debug, Clone, Copy)]
enum Expect {
    Text,
    OptionalText,
    Flag,
    Timestamp,
}

const ABSOLUTE_FIELDS: &[(&str, Expect)] = &[
    ("status", Expect::Text),
    ("retry", Expect::Flag),
    ("updated", Expect::Timestamp),
    ("outcome", Expect::OptionalText),
    ("index", Expect::Text),
    ("expires", Expect::Timestamp),
];

const ROLLING_FIELDS: &[(&str, Expect)] = &[
    ("index", Expect::Text),
    ("period", Expect::Text),
    ("outcome", Expect::Text),
    ("retry", Expect::Flag),
    ("status", Expect::Text),
    ("updated", Expect::Timestamp),
];

#[derive(Debug)]
struct FieldError {
    field: &'static str,
    message: String,
}

impl FieldError {
    fn into_error(self) -> Error {
        Error::malformed(self.field, self.message)
    }
}

/// Explain why `value` did not parse as a record.
///
/// Never empty: if no single field is at fault the parse error itself is
/// reported against `name`.
fn diagnose(
    value: &JsonValue,
    name: &'static str,
    fields: &[(&'static str, Expect)],
    parse_error: &serde_json::Error,
) -> Vec<FieldError> {
    let Some(object) = value.as_object() else {
        return vec![FieldError {
            field: name,
            message: format!("expected an object, got {}", kind(value)),
        }];
    };

    let mut errors: Vec<FieldError> = fields
        .iter()
        .filter_map(|&(field, expect)| {
            check(object.get(field), expect)
                .err()
                .map(|message| FieldError { field, message })
        })
        .collect();

    if errors.is_empty() {
        errors.push(FieldError {
            field: name,
            message: parse_error.to_string(),
        });
    }
    errors
}

fn check(value: Option<&JsonValue>, expect: Expect) -> std::result::Result<(), String> {
    let value = match (value, expect) {
        (None | Some(JsonValue::Null), Expect::OptionalText) => return Ok(()),
        (None | Some(JsonValue::Null), _) => return Err("missing".to_string()),
        (Some(value), _) => value,
    };

    match (expect, value) {
        (Expect::Text | Expect::OptionalText, _) => parse::<String>(value, "a string"),
        (Expect::Flag, _) => parse::<bool>(value, "a boolean"),
        (Expect::Timestamp, JsonValue::String(raw)) => DateTime::<Utc>::deserialize(value)
            .map(drop)
            .map_err(|e| format!("'{raw}' is not an RFC3339 timestamp: {e}")),
        (Expect::Timestamp, _) => parse::<DateTime<Utc>>(value, "an RFC3339 timestamp"),
    }
}

fn parse<T: DeserializeOwned>(value: &JsonValue, what: &str) -> std::result::Result<(), String> {
    T::deserialize(value)
        .map(drop)
        .map_err(|_| format!("expected {what}, got {}", kind(value)))
}

fn kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
