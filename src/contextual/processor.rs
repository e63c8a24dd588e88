use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backend::FacetDescriptor;
use crate::cache::CacheableMetadata;
use crate::entity::Entity;
use crate::filter::FilterSource;
use crate::source::ListSource;
use crate::types::FilterValue;

/// An index processor that can derive filter values from a context entity.
///
/// Needed for facets over processor-provided fields, which have no schema
/// field to read from.
pub trait ContextualProcessor: Send + Sync {
    fn contextual_values(
        &self,
        facet: &FacetDescriptor,
        context: &Entity,
        source: FilterSource,
        cache: &mut CacheableMetadata,
    ) -> Vec<FilterValue>;
}

/// Contextual-aware processors keyed by index processor id.
#[derive(Clone, Default)]
pub struct ContextualProcessors {
    by_processor: BTreeMap<String, Arc<dyn ContextualProcessor>>,
}

impl ContextualProcessors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, processor_id: impl Into<String>, processor: Arc<dyn ContextualProcessor>) {
        self.by_processor.insert(processor_id.into(), processor);
    }

    /// The processor backing the facet's index field, if it is contextual-aware.
    pub fn for_facet(&self, list_source: &ListSource, facet: &FacetDescriptor) -> Option<&dyn ContextualProcessor> {
        let field = list_source.index_field(facet)?;
        let processor = list_source.index().processor_for(&field.property_path)?;
        self.by_processor.get(&processor.id).map(|p| p.as_ref())
    }
}
