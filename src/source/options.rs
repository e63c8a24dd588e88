use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::backend::{SortClause, SortDirection};
use crate::filter::PresetFilterSet;
use crate::types::FilterValue;

/// Query option carrying facets whose active values the backend must ignore.
pub const OPTION_IGNORED_FILTERS: &str = "ignored_filters";
/// Query option carrying the preset filters, keyed by filter id.
pub const OPTION_PRESET_FILTERS: &str = "preset_filters";
/// Query option carrying the visitor's active exposed values, keyed by facet.
pub const OPTION_EXPOSED_FILTERS: &str = "exposed_filters";
/// Query option carrying free-form entries for backend-specific rules.
pub const OPTION_EXTRA: &str = "extra";

pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Query options must be a map")]
    NotAMap,
    #[error("Unknown query option: {0}")]
    UnknownOption(String),
    #[error("Query option {option} must be {expected}")]
    InvalidType {
        option: String,
        expected: &'static str,
    },
}

/// Parameters for building one list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub limit: usize,
    pub page: usize,
    pub languages: Vec<String>,
    /// Applied in order.
    pub sort: Vec<SortClause>,
    pub ignored_filters: BTreeSet<String>,
    pub preset_filters: PresetFilterSet,
    pub exposed_filters: BTreeMap<String, Vec<FilterValue>>,
    pub extra: BTreeMap<String, Value>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: 0,
            languages: Vec::new(),
            sort: Vec::new(),
            ignored_filters: BTreeSet::new(),
            preset_filters: PresetFilterSet::new(),
            exposed_filters: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl QueryOptions {
    /// Validate an untyped option map, defaulting every missing option.
    ///
    /// `language` accepts a single code or a list of codes. `sort` accepts a
    /// map of field to direction, applied in key order, or a list of
    /// `{field, direction}` objects.
    pub fn from_raw(raw: &Value) -> Result<Self, ConfigurationError> {
        let map = raw.as_object().ok_or(ConfigurationError::NotAMap)?;
        let mut options = QueryOptions::default();

        for (key, value) in map {
            match key.as_str() {
                "limit" => options.limit = non_negative(key, value)?,
                "page" => options.page = non_negative(key, value)?,
                "language" => options.languages = languages(key, value)?,
                "sort" => options.sort = sort_clauses(key, value)?,
                OPTION_IGNORED_FILTERS => {
                    options.ignored_filters = typed(key, value, "a list of facet ids")?
                }
                OPTION_PRESET_FILTERS => {
                    options.preset_filters = typed(key, value, "a map of preset filters")?
                }
                OPTION_EXPOSED_FILTERS => {
                    options.exposed_filters = typed(key, value, "a map of facet values")?
                }
                OPTION_EXTRA => options.extra = typed(key, value, "a map")?,
                other => return Err(ConfigurationError::UnknownOption(other.to_string())),
            }
        }

        Ok(options)
    }

    pub fn offset(&self) -> usize {
        self.limit.saturating_mul(self.page)
    }
}

fn non_negative(option: &str, value: &Value) -> Result<usize, ConfigurationError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ConfigurationError::InvalidType {
            option: option.to_string(),
            expected: "a non-negative integer",
        })
}

fn languages(option: &str, value: &Value) -> Result<Vec<String>, ConfigurationError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(code) => Ok(vec![code.clone()]),
        other => typed(option, other, "a language code or a list of codes"),
    }
}

fn sort_clauses(option: &str, value: &Value) -> Result<Vec<SortClause>, ConfigurationError> {
    const EXPECTED: &str = "a map of field to direction or a list of sort clauses";
    match value {
        Value::Object(fields) => fields
            .iter()
            .map(|(field, direction)| {
                typed::<SortDirection>(option, direction, EXPECTED).map(|d| SortClause::new(field.clone(), d))
            })
            .collect(),
        other => typed(option, other, EXPECTED),
    }
}

fn typed<T: DeserializeOwned>(option: &str, value: &Value, expected: &'static str) -> Result<T, ConfigurationError> {
    serde_json::from_value(value.clone()).map_err(|_| ConfigurationError::InvalidType {
        option: option.to_string(),
        expected,
    })
}
