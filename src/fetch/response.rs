//! Validating accessors for API response bodies.
//!
//! Every API response is shaped `{ "error": "OK" | <message>, "results": ... }`.
//! Nothing downstream indexes into a raw body: [`ApiEnvelope`] treats a missing
//! or falsy `results` as an empty result and logs a warning when the key is
//! absent altogether.

use serde_json::Value;
use tracing::warn;

/// The status string the API uses for a successful response.
const STATUS_OK: &str = "OK";

/// Parsed `{ error, results }` envelope of an API response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiEnvelope {
    error: Option<String>,
    results: Option<Value>,
}

impl ApiEnvelope {
    /// Splits a response body into its status and results.
    ///
    /// Bodies that are not JSON objects produce an envelope with neither.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };
        let error = match map.remove("error") {
            Some(Value::String(message)) => Some(message),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        Self {
            error,
            results: map.remove("results"),
        }
    }

    /// Returns the server-reported status string, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true unless the server reported a non-OK status.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.as_deref().is_none_or(|status| status == STATUS_OK)
    }

    /// Returns true if the body carried a `results` key at all.
    #[must_use]
    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }

    /// Consumes the envelope, returning `results` as a list of records.
    ///
    /// An array is returned as-is, a non-empty object becomes a one-item list,
    /// and anything falsy becomes an empty list. `source` names the request
    /// in the warning logged when `results` is missing.
    #[must_use]
    pub fn into_items(self, source: &str) -> Vec<Value> {
        match self.results {
            None => {
                warn!(source, "response has no results field; treating as empty");
                Vec::new()
            }
            Some(Value::Array(items)) => items,
            Some(value) if is_truthy(&value) => vec![value],
            Some(_) => Vec::new(),
        }
    }

    /// Consumes the envelope, returning `results` as a single record if it is non-empty.
    #[must_use]
    pub fn into_item(self, source: &str) -> Option<Value> {
        match self.results {
            None => {
                warn!(source, "response has no results field; treating as empty");
                None
            }
            Some(value) if is_truthy(&value) => Some(value),
            Some(_) => None,
        }
    }
}

/// Returns the array stored under `key`, or an empty list if it is missing or not an array.
///
/// Used for bodies that are not wrapped in the standard envelope, such as the
/// image-data endpoint's `{ "images": [...] }`.
#[must_use]
pub fn items_at(value: &Value, key: &str, source: &str) -> Vec<Value> {
    match value.get(key) {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) => Vec::new(),
        Some(_) => {
            warn!(source, key, "response field is not a list; treating as empty");
            Vec::new()
        }
        None => {
            warn!(source, key, "response field missing; treating as empty");
            Vec::new()
        }
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
