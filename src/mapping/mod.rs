//! Finding the field on one entity type that corresponds to a field on another.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cache::CacheableMetadata;
use crate::entity::EntitySchema;

/// Name of the mapping configuration, as recorded in cache dependencies.
pub const FIELD_MAPPING_CONFIG: &str = "field_mapping";

/// Ordered alternatives for field names that differ between entity types.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMappingConfig {
    aliases: BTreeMap<String, Vec<String>>,
}

impl FieldMappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, field: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.entry(field.into()).or_default().push(alias.into());
        self
    }

    pub fn aliases(&self, field: &str) -> &[String] {
        self.aliases.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldNameMapper {
    config: FieldMappingConfig,
}

impl FieldNameMapper {
    pub fn new(config: FieldMappingConfig) -> Self {
        Self { config }
    }

    /// Name of the field on (`entity_type`, `bundle`) equivalent to `field`.
    ///
    /// The identical name wins, then each alias in configured order.
    pub fn map(
        &self,
        field: &str,
        entity_type: &str,
        bundle: &str,
        schema: &dyn EntitySchema,
        cache: &mut CacheableMetadata,
    ) -> Option<String> {
        cache.add_config(FIELD_MAPPING_CONFIG);

        std::iter::once(field)
            .chain(self.config.aliases(field).iter().map(String::as_str))
            .find(|candidate| schema.field_definition(entity_type, bundle, candidate).is_some())
            .map(str::to_string)
    }
}
