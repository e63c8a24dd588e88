pub mod backends;
pub mod expander;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::entity::VocabularyKind;
use crate::filter::PresetFilter;
use crate::types::FilterValue;

pub use backends::{Concept, ConceptScheme, Term, TermTree};
pub use expander::{Hierarchy, HierarchyExpander};

/// Hierarchy backend per vocabulary kind.
#[derive(Clone, Default)]
pub struct HierarchyBackends {
    by_kind: BTreeMap<VocabularyKind, Arc<dyn Hierarchy>>,
}

impl HierarchyBackends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: VocabularyKind, backend: Arc<dyn Hierarchy>) {
        self.by_kind.insert(kind, backend);
    }

    pub fn with(mut self, kind: VocabularyKind, backend: Arc<dyn Hierarchy>) -> Self {
        self.register(kind, backend);
        self
    }

    pub fn for_vocabulary(&self, kind: VocabularyKind) -> Option<&dyn Hierarchy> {
        self.by_kind.get(&kind).map(|h| h.as_ref())
    }
}

/// Flatten the values of a "match with hierarchy" filter.
///
/// Every value is replaced by its hierarchy; duplicates keep their first
/// position.
pub fn expand_values(values: &[FilterValue], hierarchy: &dyn Hierarchy) -> Vec<FilterValue> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();

    for value in values {
        for id in hierarchy.get_hierarchy(&value.canonical()) {
            if seen.insert(id.clone()) {
                out.push(FilterValue::String(id));
            }
        }
    }

    out
}

pub fn expand_with_hierarchy(filter: &PresetFilter, hierarchy: &dyn Hierarchy) -> PresetFilter {
    PresetFilter {
        facet_id: filter.facet_id.clone(),
        operator: filter.operator,
        values: expand_values(&filter.values, hierarchy),
    }
}
