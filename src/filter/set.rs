use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::filter::preset::PresetFilter;
use crate::types::{generate_filter_id, FilterId, FilterValue};

/// Preset filters keyed by filter id.
///
/// Several filters may target the same facet. Filters with different ids
/// combine with AND; each filter applies its own operator to its values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetFilterSet {
    inner: BTreeMap<FilterId, PresetFilter>,
}

impl PresetFilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter under a freshly generated id and return that id.
    pub fn add(&mut self, filter: PresetFilter) -> FilterId {
        let id = generate_filter_id(&filter.facet_id, &self.ids());
        self.inner.insert(id.clone(), filter);
        id
    }

    pub fn insert(&mut self, id: FilterId, filter: PresetFilter) -> Option<PresetFilter> {
        self.inner.insert(id, filter)
    }

    pub fn remove(&mut self, id: &FilterId) -> Option<PresetFilter> {
        self.inner.remove(id)
    }

    pub fn get(&self, id: &FilterId) -> Option<&PresetFilter> {
        self.inner.get(id)
    }

    pub fn ids(&self) -> BTreeSet<FilterId> {
        self.inner.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterId, &PresetFilter)> {
        self.inner.iter()
    }

    pub fn for_facet<'a>(&'a self, facet_id: &'a str) -> impl Iterator<Item = &'a PresetFilter> + 'a {
        self.inner.values().filter(move |f| f.facet_id == facet_id)
    }

    /// Facet ids targeted by at least one filter.
    pub fn facets(&self) -> BTreeSet<&str> {
        self.inner.values().map(|f| f.facet_id.as_str()).collect()
    }

    /// AND across all filters, given the values content carries per facet.
    pub fn matches(&self, facet_values: &BTreeMap<String, Vec<FilterValue>>) -> bool {
        self.inner.values().all(|filter| {
            let candidate = facet_values
                .get(&filter.facet_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            filter.matches(candidate)
        })
    }
}

impl FromIterator<PresetFilter> for PresetFilterSet {
    fn from_iter<T: IntoIterator<Item = PresetFilter>>(iter: T) -> Self {
        let mut set = PresetFilterSet::new();
        for filter in iter {
            set.add(filter);
        }
        set
    }
}
