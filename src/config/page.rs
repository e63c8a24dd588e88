use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::SortClause;
use crate::filter::{ContextualFilter, PresetFilter, PresetFilterSet};
use crate::source::ListSource;
use crate::types::{generate_filter_id, FilterId, Fingerprint};

/// Everything needed to run one list, as stored with the page that shows it.
///
/// Treated as an immutable value per execution. Serialization is stable
/// (ordered maps throughout), which is what the fingerprint hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPageConfiguration {
    pub entity_type: String,
    pub bundle: String,
    /// Facets the visitor may change; only honoured when overridden.
    #[serde(default)]
    pub exposed_filters: Vec<String>,
    #[serde(default)]
    pub exposed_filters_overridden: bool,
    #[serde(default)]
    pub default_filter_values: PresetFilterSet,
    #[serde(default)]
    pub contextual_filters: BTreeMap<FilterId, ContextualFilter>,
    /// `None` falls back to the engine's default limit.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub sort: Vec<SortClause>,
    /// Whether the visitor may pick the sort.
    #[serde(default)]
    pub exposed_sort: bool,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
    /// Keep the context entity itself out of the results.
    #[serde(default)]
    pub exclude_context_entity: bool,
    #[serde(skip)]
    list_source: Option<Arc<ListSource>>,
}

impl ListPageConfiguration {
    pub fn new(entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            exposed_filters: Vec::new(),
            exposed_filters_overridden: false,
            default_filter_values: PresetFilterSet::new(),
            contextual_filters: BTreeMap::new(),
            limit: None,
            page: 0,
            sort: Vec::new(),
            exposed_sort: false,
            languages: Vec::new(),
            extra: BTreeMap::new(),
            exclude_context_entity: false,
            list_source: None,
        }
    }

    /// Use `list_source` instead of looking one up by entity type and bundle.
    pub fn with_list_source(mut self, list_source: Arc<ListSource>) -> Self {
        self.list_source = Some(list_source);
        self
    }

    pub fn list_source(&self) -> Option<&Arc<ListSource>> {
        self.list_source.as_ref()
    }

    pub fn set_list_source(&mut self, list_source: Option<Arc<ListSource>>) {
        self.list_source = list_source;
    }

    pub fn with_exposed_filters(mut self, facets: Vec<String>) -> Self {
        self.exposed_filters = facets;
        self.exposed_filters_overridden = true;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortClause>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    /// Ids in use by preset or contextual filters.
    pub fn filter_ids(&self) -> BTreeSet<FilterId> {
        let mut ids = self.default_filter_values.ids();
        ids.extend(self.contextual_filters.keys().cloned());
        ids
    }

    pub fn add_default_filter(&mut self, filter: PresetFilter) -> FilterId {
        let id = generate_filter_id(&filter.facet_id, &self.filter_ids());
        self.default_filter_values.insert(id.clone(), filter);
        id
    }

    pub fn add_contextual_filter(&mut self, filter: ContextualFilter) -> FilterId {
        let id = generate_filter_id(filter.facet_id(), &self.filter_ids());
        self.contextual_filters.insert(id.clone(), filter);
        id
    }

    pub fn has_contextual_filters(&self) -> bool {
        !self.contextual_filters.is_empty()
    }

    /// Stable hash of this configuration, including an explicit list source.
    pub fn fingerprint(&self) -> Fingerprint {
        // Serializing plain data with string keys cannot fail.
        let body = serde_json::to_vec(self).unwrap_or_default();
        let source = self
            .list_source
            .as_ref()
            .map(|s| s.search_id().as_str().as_bytes())
            .unwrap_or_default();

        Fingerprint::from_parts([body.as_slice(), b"\n".as_slice(), source])
    }
}
