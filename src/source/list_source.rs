use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::backend::{
    datasource_id, ConditionOperator, FacetDescriptor, IndexDescriptor, IndexField, Query,
    DATASOURCE_FIELD,
};
use crate::source::options::{
    ConfigurationError, QueryOptions, OPTION_EXPOSED_FILTERS, OPTION_EXTRA,
    OPTION_IGNORED_FILTERS, OPTION_PRESET_FILTERS,
};
use crate::types::{FilterValue, SearchId};

/// Binds one (entity type, bundle) pair to a search index and its facets.
#[derive(Debug, Clone)]
pub struct ListSource {
    search_id: SearchId,
    entity_type: String,
    bundle: String,
    bundle_key: Option<String>,
    index: Arc<IndexDescriptor>,
    facets: BTreeMap<String, FacetDescriptor>,
}

impl ListSource {
    pub fn new(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        bundle_key: Option<String>,
        index: Arc<IndexDescriptor>,
    ) -> Self {
        let entity_type = entity_type.into();
        let bundle = bundle.into();
        Self {
            search_id: SearchId::for_bundle(&entity_type, &bundle),
            entity_type,
            bundle,
            bundle_key,
            index,
            facets: BTreeMap::new(),
        }
    }

    /// Attach the facets whose facet source is this list source; others are ignored.
    pub fn with_facets<'a>(mut self, facets: impl IntoIterator<Item = &'a FacetDescriptor>) -> Self {
        for facet in facets {
            if facet.facet_source == self.search_id.as_str() {
                self.facets.insert(facet.id.clone(), facet.clone());
            }
        }
        self
    }

    pub fn search_id(&self) -> &SearchId {
        &self.search_id
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    pub fn bundle_key(&self) -> Option<&str> {
        self.bundle_key.as_deref()
    }

    pub fn index(&self) -> &IndexDescriptor {
        &self.index
    }

    /// Facet id to label, for building pick-lists.
    pub fn available_filters(&self) -> BTreeMap<String, String> {
        self.facets
            .values()
            .map(|f| (f.id.clone(), f.label.clone()))
            .collect()
    }

    pub fn facets(&self) -> impl Iterator<Item = &FacetDescriptor> {
        self.facets.values()
    }

    pub fn facet(&self, facet_id: &str) -> Option<&FacetDescriptor> {
        self.facets.get(facet_id)
    }

    /// Index field a facet filters on.
    pub fn index_field(&self, facet: &FacetDescriptor) -> Option<&IndexField> {
        self.index.field(&facet.field_identifier)
    }

    /// Build a query from an untyped option map.
    pub fn get_query_raw(&self, raw: &Value) -> Result<Query, ConfigurationError> {
        let options = QueryOptions::from_raw(raw)?;
        Ok(self.get_query(&options))
    }

    /// Build the backend query for `options`.
    ///
    /// Preset, exposed and ignored filters travel as query options; the
    /// backend's facet pipeline applies them.
    pub fn get_query(&self, options: &QueryOptions) -> Query {
        let mut query = Query::new(self.index.id.clone());
        query.range(options.offset(), options.limit);

        if !options.languages.is_empty() {
            query.set_languages(options.languages.clone());

            if let Some(field) = &self.index.language_fallback_field {
                let values: Vec<FilterValue> = options
                    .languages
                    .iter()
                    .map(|l| FilterValue::String(l.clone()))
                    .collect();
                let operator = if values.len() == 1 {
                    ConditionOperator::Eq
                } else {
                    ConditionOperator::In
                };
                query.add_condition_with(field.clone(), values, operator);
            }
        }

        query.set_option(OPTION_IGNORED_FILTERS, to_value(&options.ignored_filters));
        query.set_option(OPTION_PRESET_FILTERS, to_value(&options.preset_filters));
        query.set_option(OPTION_EXPOSED_FILTERS, to_value(&options.exposed_filters));
        query.set_option(OPTION_EXTRA, to_value(&options.extra));

        if let Some(key) = &self.bundle_key {
            query.add_condition(key.clone(), self.bundle.as_str());
        }
        query.add_condition(DATASOURCE_FIELD, datasource_id(&self.entity_type));

        for clause in &options.sort {
            query.sort(clause.field.clone(), clause.direction);
        }

        trace!(search_id = %self.search_id, conditions = query.conditions.len(), "built list query");

        query
    }
}

// Serializing maps, sets and filter values to JSON cannot fail.
fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
