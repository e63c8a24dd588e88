use serde::{Deserialize, Serialize};

use crate::types::FilterValue;

/// How the values inside one preset filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Every value is required.
    And,
    /// Any value suffices.
    #[default]
    Or,
    /// None of the values may be present.
    Not,
}

/// A filter value fixed by configuration rather than by the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetFilter {
    pub facet_id: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub values: Vec<FilterValue>,
}

impl PresetFilter {
    pub fn new(facet_id: impl Into<String>, operator: Operator, values: Vec<FilterValue>) -> Self {
        Self {
            facet_id: facet_id.into(),
            operator,
            values,
        }
    }

    /// Whether content carrying `candidate` on this filter's facet passes.
    ///
    /// A filter with no values does not constrain anything.
    pub fn matches(&self, candidate: &[FilterValue]) -> bool {
        if self.values.is_empty() {
            return true;
        }

        let present = |v: &FilterValue| candidate.iter().any(|c| c.same_as(v));

        match self.operator {
            Operator::And => self.values.iter().all(present),
            Operator::Or => self.values.iter().any(present),
            Operator::Not => !self.values.iter().any(present),
        }
    }
}

/// Where a contextual filter takes its values from when it has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSource {
    /// Values of the equivalent field on the context entity.
    #[default]
    FieldValues,
    /// The context entity's own id.
    EntityId,
}

/// A preset filter whose values are computed per request from a context entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualFilter {
    #[serde(flatten)]
    pub preset: PresetFilter,
    #[serde(default)]
    pub filter_source: FilterSource,
}

impl ContextualFilter {
    pub fn new(facet_id: impl Into<String>, operator: Operator, filter_source: FilterSource) -> Self {
        Self {
            preset: PresetFilter::new(facet_id, operator, Vec::new()),
            filter_source,
        }
    }

    pub fn facet_id(&self) -> &str {
        &self.preset.facet_id
    }

    pub fn operator(&self) -> Operator {
        self.preset.operator
    }
}
