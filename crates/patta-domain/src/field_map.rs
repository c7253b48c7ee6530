//! Loosely-typed field bags
//!
//! A `FieldMap` carries whatever a caller or an extraction call produced. Keys
//! form an open vocabulary (`claimant_name`, `village`, `area`, ...); values
//! keep their source shape so the bag can be stored verbatim as provenance.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// A single value inside a [`FieldMap`]
///
/// Deserialised untagged, so any JSON value maps onto exactly one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent or explicit null
    #[default]
    Null,

    /// Boolean flag
    Bool(bool),

    /// Any JSON number, integers kept exact
    Number(Number),

    /// Free text
    Text(String),

    /// Ordered list (kept opaque)
    List(Vec<FieldValue>),

    /// Nested object (kept opaque)
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// True for `Null` and for text that is empty after trimming
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Borrow the text content, if this is a `Text` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content as a float, if this is a `Number` value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Numeric content as an unsigned integer, if it is one
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                f.write_str(&parts.join(", "))
            }
            FieldValue::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Non-finite floats have no JSON form and become `Null`
impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(FieldValue::Null, FieldValue::Number)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::Number(n.into())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Open key/value mapping produced by a caller or by extraction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

static NULL: FieldValue = FieldValue::Null;

impl FieldMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one for that key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a key; missing keys read as `Null`
    pub fn get(&self, key: &str) -> &FieldValue {
        self.0.get(key).unwrap_or(&NULL)
    }

    /// Whether the key is present (even if null)
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the map has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, FieldValue>> for FieldMap {
    fn from(map: BTreeMap<String, FieldValue>) -> Self {
        Self(map)
    }
}
