use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar filter value.
///
/// Values compare by their canonical string form when matched against
/// indexed content, so `Integer(5)` and `String("5")` select the same items.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl FilterValue {
    pub fn canonical(&self) -> String {
        match self {
            FilterValue::Boolean(true) => "1".to_string(),
            FilterValue::Boolean(false) => "0".to_string(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::String(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn same_as(&self, other: &FilterValue) -> bool {
        self == other || self.canonical() == other.canonical()
    }

    /// Convert a JSON scalar into a filter value. Non-scalars are rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(FilterValue::Boolean(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(FilterValue::Integer),
            serde_json::Value::String(s) => Some(FilterValue::String(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}
