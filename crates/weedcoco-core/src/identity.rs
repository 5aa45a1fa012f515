//! # Record Identity
//!
//! Identifier types for records inside a WeedCOCO document.
//!
//! Ids are whatever scalar a producer wrote: usually an integer, sometimes
//! a string. Uniqueness and reference resolution compare ids structurally
//! and per namespace, so an `image` with id `0` and an `agcontext` with id
//! `0` never collide.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// The value of a record's `id` field, or of a `*_id` reference field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    /// An integer id that fits in `i64`.
    Integer(i64),
    /// A string id.
    Text(String),
    /// Any other JSON value, held as its compact JSON text.
    Other(String),
}

impl RecordId {
    /// Build an id from a JSON value. Total: every value maps to some id.
    ///
    /// Whole-number floats that fit in `i64` are integers.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64().or_else(|| n.as_f64().and_then(integral)) {
                Some(i) => RecordId::Integer(i),
                None => RecordId::Other(n.to_string()),
            },
            Value::String(s) => RecordId::Text(s.clone()),
            other => RecordId::Other(other.to_string()),
        }
    }
}

/// `f` as an `i64` when it is a whole number in range. `46.0` is the same
/// id as `46`.
fn integral(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.is_finite() && f.fract() == 0.0 && f >= -LIMIT && f < LIMIT).then_some(f as i64)
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Integer(value)
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        RecordId::Integer(i64::from(value))
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Integer(i) => write!(f, "{i}"),
            RecordId::Text(s) => write!(f, "'{s}'"),
            RecordId::Other(raw) => f.write_str(raw),
        }
    }
}

/// A namespace-scoped id: the unit of uniqueness and of reference lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdKey {
    /// Entity-type key, e.g. `image` or `category`.
    pub namespace: String,
    /// The id within that namespace.
    pub id: RecordId,
}

impl IdKey {
    /// Create a key from a namespace and anything convertible to a [`RecordId`].
    pub fn new(namespace: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for IdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(\"{}\", {})", self.namespace, self.id)
    }
}
