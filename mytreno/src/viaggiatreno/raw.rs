//! Loose access to upstream JSON.
//!
//! ViaggiaTreno omits fields freely, sends `null` for others, and is not
//! consistent about numbers vs strings. Rather than mirror every response in
//! a struct full of `Option`s, records are kept as JSON objects and read
//! field by field with an explicit default, then normalized into the domain
//! types.

use serde_json::{Map, Value};

use crate::domain::Delay;

use super::error::{Endpoint, FetchCause, FetchError};

/// Conversion from a JSON value to a field type.
///
/// Returns `None` when the value has the wrong shape, which callers treat
/// the same as a missing field.
pub trait FromField: Sized {
    fn from_field(value: &Value) -> Option<Self>;
}

impl FromField for String {
    fn from_field(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl FromField for i64 {
    fn from_field(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromField for Delay {
    fn from_field(value: &Value) -> Option<Self> {
        match value {
            Value::Number(_) => i64::from_field(value).map(Delay::Minutes),
            Value::String(s) => Some(Delay::Text(s.clone())),
            _ => None,
        }
    }
}

impl FromField for Value {
    fn from_field(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// One JSON object from upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Wrap a JSON value. Anything other than an object becomes an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => RawRecord(map),
            _ => RawRecord::default(),
        }
    }

    /// Raw value for `key`. `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Field value, if present and of a usable shape.
    pub fn get_opt<T: FromField>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(T::from_field)
    }

    /// Field value, or `default` when absent, `null` or of the wrong shape.
    pub fn get_with_default<T: FromField>(&self, key: &str, default: T) -> T {
        self.get_opt(key).unwrap_or(default)
    }

    /// Whether `key` holds a "truthy" value: present, not `false`, not zero,
    /// not an empty string, array or object.
    pub fn is_truthy(&self, key: &str) -> bool {
        match self.get(key) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(Value::Null) => false,
        }
    }

    /// First of `keys` holding a non-empty string.
    pub fn first_non_empty(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get_opt::<String>(key))
            .find(|s| !s.is_empty())
    }

    /// Nested object under `key`; empty if missing or not an object.
    pub fn record(&self, key: &str) -> RawRecord {
        self.get(key)
            .cloned()
            .map(RawRecord::from_value)
            .unwrap_or_default()
    }
}

/// Decode a response body as JSON.
pub fn parse_json(endpoint: Endpoint, body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::failed(endpoint, FetchCause::Json(e.to_string())))
}

/// Records of a JSON array, keeping at most `limit`.
///
/// A body that is valid JSON but not an array yields no records.
pub fn records(value: Value, limit: usize) -> Vec<RawRecord> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .take(limit)
            .map(RawRecord::from_value)
            .collect(),
        _ => Vec::new(),
    }
}
