use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::Entity;
use crate::types::FilterValue;

/// Field the backend stores the originating datasource in.
pub const DATASOURCE_FIELD: &str = "search_api_datasource";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<>")]
    Ne,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub values: Vec<FilterValue>,
    pub operator: ConditionOperator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub direction: SortDirection,
}

impl SortClause {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// A parameterized query against one index.
///
/// Options are opaque JSON payloads read by the backend's own facet and
/// processor pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub index_id: String,
    pub conditions: Vec<Condition>,
    pub options: BTreeMap<String, serde_json::Value>,
    pub sorts: Vec<SortClause>,
    pub offset: usize,
    pub limit: Option<usize>,
    pub languages: Vec<String>,
}

impl Query {
    pub fn new(index_id: impl Into<String>) -> Self {
        Self {
            index_id: index_id.into(),
            conditions: Vec::new(),
            options: BTreeMap::new(),
            sorts: Vec::new(),
            offset: 0,
            limit: None,
            languages: Vec::new(),
        }
    }

    pub fn add_condition(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> &mut Self {
        self.add_condition_with(field, vec![value.into()], ConditionOperator::Eq)
    }

    pub fn add_condition_with(
        &mut self,
        field: impl Into<String>,
        values: Vec<FilterValue>,
        operator: ConditionOperator,
    ) -> &mut Self {
        self.conditions.push(Condition {
            field: field.into(),
            values,
            operator,
        });
        self
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }

    pub fn sort(&mut self, field: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.sorts.push(SortClause::new(field, direction));
        self
    }

    pub fn range(&mut self, offset: usize, limit: usize) -> &mut Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn set_languages(&mut self, languages: Vec<String>) -> &mut Self {
        self.languages = languages;
        self
    }

    pub fn conditions_on<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Condition> + 'a {
        self.conditions.iter().filter(move |c| c.field == field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: String,
    #[serde(default)]
    pub entity: Option<Entity>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    /// Total matches before paging.
    pub result_count: usize,
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),
    #[error("Query execution failed: {0}")]
    Execution(String),
    #[error("Query execution timed out")]
    Timeout,
}

/// The search server executing built queries.
pub trait SearchBackend {
    fn execute(&self, query: &Query) -> Result<ResultSet, BackendError>;
}

impl<B: SearchBackend + ?Sized> SearchBackend for &B {
    fn execute(&self, query: &Query) -> Result<ResultSet, BackendError> {
        (**self).execute(query)
    }
}

impl<B: SearchBackend + ?Sized> SearchBackend for std::sync::Arc<B> {
    fn execute(&self, query: &Query) -> Result<ResultSet, BackendError> {
        (**self).execute(query)
    }
}
