use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::backend::FacetDescriptor;
use crate::cache::{CacheableMetadata, ROUTE_CONTEXT};
use crate::config::ListPageConfiguration;
use crate::contextual::processor::ContextualProcessors;
use crate::entity::{Entity, EntitySchema, FieldDefinition};
use crate::filter::{ContextualFilter, FilterSource, PresetFilter};
use crate::hierarchy::{expand_values, HierarchyBackends};
use crate::mapping::FieldNameMapper;
use crate::plugins::PluginRegistry;
use crate::source::ListSource;
use crate::types::FilterValue;

/// Key of the `extra` entry asking the backend to leave out the context entity.
///
/// Payload: `{"id": .., "entity_type": .., "bundle": ..}`.
pub const EXCLUDE_CONTEXT_ENTITY_KEY: &str = "exclude_context_entity";

/// A contextual filter that cannot be satisfied for this request.
///
/// The list must then render empty, never unfiltered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InapplicableFilter {
    #[error("Contextual filters are configured but no context entity is available")]
    NoContextEntity,
    #[error("Facet {facet_id} is not available on list source {search_id}")]
    UnknownFacet { facet_id: String, search_id: String },
    #[error("No field on {entity_type} corresponds to {field} for facet {facet_id}")]
    UnmappedField {
        facet_id: String,
        field: String,
        entity_type: String,
    },
    #[error("Context entity has no values for facet {facet_id}")]
    NoValues { facet_id: String },
    #[error("No plugin extracts values for facet {facet_id}")]
    NoPlugin { facet_id: String },
    #[error("No contextual processor provides values for facet {facet_id}")]
    NoProcessor { facet_id: String },
}

/// Turns contextual filters into concrete preset filters for one request.
pub struct ContextualFilterResolver {
    schema: Arc<dyn EntitySchema + Send + Sync>,
    registry: PluginRegistry,
    processors: ContextualProcessors,
    mapper: FieldNameMapper,
    hierarchies: HierarchyBackends,
}

impl ContextualFilterResolver {
    pub fn new(schema: Arc<dyn EntitySchema + Send + Sync>, registry: PluginRegistry, mapper: FieldNameMapper) -> Self {
        Self {
            schema,
            registry,
            processors: ContextualProcessors::new(),
            mapper,
            hierarchies: HierarchyBackends::new(),
        }
    }

    pub fn with_processors(mut self, processors: ContextualProcessors) -> Self {
        self.processors = processors;
        self
    }

    pub fn with_hierarchies(mut self, hierarchies: HierarchyBackends) -> Self {
        self.hierarchies = hierarchies;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn schema(&self) -> &dyn EntitySchema {
        self.schema.as_ref()
    }

    /// Resolve every contextual filter of `configuration` against `context`.
    ///
    /// Resolved filters are appended to the default filter values and the
    /// contextual list is emptied. Dependencies are recorded in `cache`
    /// whether or not resolution succeeds.
    pub fn process_configuration(
        &self,
        configuration: &ListPageConfiguration,
        list_source: &ListSource,
        context: Option<&Entity>,
        cache: &mut CacheableMetadata,
    ) -> Result<ListPageConfiguration, InapplicableFilter> {
        let mut processed = configuration.clone();
        if !configuration.has_contextual_filters() && !configuration.exclude_context_entity {
            return Ok(processed);
        }

        cache.add_context(ROUTE_CONTEXT);

        let context = match context {
            Some(entity) => entity,
            None if configuration.has_contextual_filters() => {
                debug!(search_id = %list_source.search_id(), "no context entity for contextual filters");
                return Err(InapplicableFilter::NoContextEntity);
            }
            None => return Ok(processed),
        };
        cache.add_tag(context.cache_tag());

        if configuration.exclude_context_entity {
            processed.extra.insert(
                EXCLUDE_CONTEXT_ENTITY_KEY.to_string(),
                json!({
                    "id": context.id,
                    "entity_type": context.entity_type,
                    "bundle": context.bundle,
                }),
            );
        }

        // Every filter is resolved so each records its dependencies; the
        // first failure in filter id order is reported.
        let contextual = std::mem::take(&mut processed.contextual_filters);
        let mut first_error = None;
        for filter in contextual.values() {
            match self.resolve_filter(filter, list_source, context, cache) {
                Ok(resolved) => {
                    processed.add_default_filter(resolved);
                }
                Err(err) => {
                    debug!(facet = filter.facet_id(), error = %err, "contextual filter inapplicable");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(processed),
        }
    }

    /// Concrete preset filter for one contextual filter.
    pub fn resolve_filter(
        &self,
        filter: &ContextualFilter,
        list_source: &ListSource,
        context: &Entity,
        cache: &mut CacheableMetadata,
    ) -> Result<PresetFilter, InapplicableFilter> {
        let facet_id = filter.facet_id();
        let facet = list_source
            .facet(facet_id)
            .ok_or_else(|| InapplicableFilter::UnknownFacet {
                facet_id: facet_id.to_string(),
                search_id: list_source.search_id().to_string(),
            })?;
        let processor = self.processors.for_facet(list_source, facet);

        if filter.filter_source == FilterSource::EntityId && processor.is_none() {
            return Ok(PresetFilter::new(
                facet_id,
                filter.operator(),
                vec![FilterValue::String(context.id.clone())],
            ));
        }

        let definition = list_source.index_field(facet).and_then(|f| {
            self.schema
                .field_definition(list_source.entity_type(), list_source.bundle(), f.field_name())
        });

        let values = match definition {
            Some(definition) => self.field_values(filter, facet, definition, list_source, context, cache)?,
            None => {
                let processor = processor.ok_or_else(|| InapplicableFilter::NoProcessor {
                    facet_id: facet_id.to_string(),
                })?;
                processor.contextual_values(facet, context, filter.filter_source, cache)
            }
        };

        if values.is_empty() {
            return Err(InapplicableFilter::NoValues {
                facet_id: facet_id.to_string(),
            });
        }

        Ok(PresetFilter::new(facet_id, filter.operator(), values))
    }

    fn field_values(
        &self,
        filter: &ContextualFilter,
        facet: &FacetDescriptor,
        definition: &FieldDefinition,
        list_source: &ListSource,
        context: &Entity,
        cache: &mut CacheableMetadata,
    ) -> Result<Vec<FilterValue>, InapplicableFilter> {
        let mapped = self
            .mapper
            .map(
                &definition.name,
                &context.entity_type,
                &context.bundle,
                self.schema.as_ref(),
                cache,
            )
            .ok_or_else(|| InapplicableFilter::UnmappedField {
                facet_id: facet.id.clone(),
                field: definition.name.clone(),
                entity_type: context.entity_type.clone(),
            })?;

        let no_plugin = || InapplicableFilter::NoPlugin {
            facet_id: facet.id.clone(),
        };
        let resolved = self
            .registry
            .resolve(&facet.id, list_source, self.schema.as_ref())
            .map_err(|_| no_plugin())?;
        let plugin = resolved
            .configure(&facet.id, list_source, Some(&filter.preset), None)
            .ok_or_else(no_plugin)?;

        let mut values = plugin.entity_values(context.field_items(&mapped));

        if facet.hierarchy {
            if let Some(hierarchy) = definition
                .target_vocabulary
                .and_then(|kind| self.hierarchies.for_vocabulary(kind))
            {
                values = expand_values(&values, hierarchy);
            }
        }

        Ok(values)
    }
}
