use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::entity::{EntitySchema, FieldDefinition, FieldItem};
use crate::filter::PresetFilter;
use crate::plugins::builtin::{BooleanPlugin, DatePlugin, EntityReferencePlugin, FulltextPlugin, ListPlugin};
use crate::plugins::{EntityLabels, FieldTypePlugin, PluginContext, ValueForm};
use crate::source::ListSource;
use crate::types::FilterValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No field type plugin handles facet {facet_id}")]
pub struct PluginResolutionMiss {
    pub facet_id: String,
}

/// Which lookup produced a plugin. Earlier tiers win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginTier {
    Facet,
    FieldType,
    DataType,
}

/// Facet, field type and data type registrations, queried in that order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    by_facet: BTreeMap<String, Arc<dyn FieldTypePlugin>>,
    by_field_type: BTreeMap<String, Arc<dyn FieldTypePlugin>>,
    by_data_type: BTreeMap<String, Arc<dyn FieldTypePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in plugins for common field and data types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let reference: Arc<dyn FieldTypePlugin> = Arc::new(EntityReferencePlugin);
        let list: Arc<dyn FieldTypePlugin> = Arc::new(ListPlugin);
        let boolean: Arc<dyn FieldTypePlugin> = Arc::new(BooleanPlugin);
        let date: Arc<dyn FieldTypePlugin> = Arc::new(DatePlugin);
        let fulltext: Arc<dyn FieldTypePlugin> = Arc::new(FulltextPlugin);

        registry.register_for_field_type("entity_reference", Arc::clone(&reference));
        for field_type in ["list_string", "list_integer", "list_float"] {
            registry.register_for_field_type(field_type, Arc::clone(&list));
        }
        registry.register_for_field_type("boolean", Arc::clone(&boolean));
        for field_type in ["datetime", "daterange", "created", "changed", "timestamp"] {
            registry.register_for_field_type(field_type, Arc::clone(&date));
        }

        registry.register_for_data_type("boolean", boolean);
        registry.register_for_data_type("date", date);
        for data_type in ["string", "text", "integer"] {
            registry.register_for_data_type(data_type, Arc::clone(&fulltext));
        }

        registry
    }

    pub fn register_for_facet(&mut self, facet_id: impl Into<String>, plugin: Arc<dyn FieldTypePlugin>) {
        self.by_facet.insert(facet_id.into(), plugin);
    }

    pub fn register_for_field_type(&mut self, field_type: impl Into<String>, plugin: Arc<dyn FieldTypePlugin>) {
        self.by_field_type.insert(field_type.into(), plugin);
    }

    pub fn register_for_data_type(&mut self, data_type: impl Into<String>, plugin: Arc<dyn FieldTypePlugin>) {
        self.by_data_type.insert(data_type.into(), plugin);
    }

    /// Find the plugin handling `facet_id` on `list_source`.
    pub fn resolve(
        &self,
        facet_id: &str,
        list_source: &ListSource,
        schema: &dyn EntitySchema,
    ) -> Result<ResolvedPlugin, PluginResolutionMiss> {
        let miss = || PluginResolutionMiss {
            facet_id: facet_id.to_string(),
        };

        let facet = list_source.facet(facet_id).ok_or_else(miss)?;
        let index_field = list_source.index_field(facet);
        let field = index_field.and_then(|f| {
            schema
                .field_definition(list_source.entity_type(), list_source.bundle(), f.field_name())
                .cloned()
        });

        let found = self
            .by_facet
            .get(facet_id)
            .map(|p| (p, PluginTier::Facet))
            .or_else(|| {
                field
                    .as_ref()
                    .and_then(|d| self.by_field_type.get(&d.field_type))
                    .map(|p| (p, PluginTier::FieldType))
            })
            .or_else(|| {
                index_field
                    .and_then(|f| self.by_data_type.get(&f.data_type))
                    .map(|p| (p, PluginTier::DataType))
            });

        match found {
            Some((plugin, tier)) => Ok(ResolvedPlugin {
                plugin: Arc::clone(plugin),
                tier,
                field,
            }),
            None => {
                debug!(facet = facet_id, search_id = %list_source.search_id(), "no plugin for facet");
                Err(miss())
            }
        }
    }

    /// Facets of `list_source` a plugin can handle, id to label.
    ///
    /// Facets without a plugin are left out.
    pub fn editable_filters(&self, list_source: &ListSource, schema: &dyn EntitySchema) -> BTreeMap<String, String> {
        list_source
            .available_filters()
            .into_iter()
            .filter(|(id, _)| self.resolve(id, list_source, schema).is_ok())
            .collect()
    }
}

/// Outcome of a registry lookup.
#[derive(Clone)]
pub struct ResolvedPlugin {
    pub plugin: Arc<dyn FieldTypePlugin>,
    pub tier: PluginTier,
    pub field: Option<FieldDefinition>,
}

impl ResolvedPlugin {
    pub fn id(&self) -> &'static str {
        self.plugin.id()
    }

    /// Bind the plugin to one use. Returns `None` if the facet is not on `list_source`.
    pub fn configure<'a>(
        &'a self,
        facet_id: &str,
        list_source: &'a ListSource,
        preset_filter: Option<&'a PresetFilter>,
        labels: Option<&'a dyn EntityLabels>,
    ) -> Option<ConfiguredPlugin<'a>> {
        let facet = list_source.facet(facet_id)?;
        Some(ConfiguredPlugin {
            plugin: self.plugin.as_ref(),
            ctx: PluginContext {
                facet,
                preset_filter,
                list_source,
                field: self.field.as_ref(),
                labels,
            },
        })
    }
}

/// A plugin bound to the context of one use.
pub struct ConfiguredPlugin<'a> {
    plugin: &'a dyn FieldTypePlugin,
    ctx: PluginContext<'a>,
}

impl<'a> ConfiguredPlugin<'a> {
    pub fn context(&self) -> &PluginContext<'a> {
        &self.ctx
    }

    pub fn default_values(&self) -> Vec<FilterValue> {
        self.plugin.default_values(&self.ctx)
    }

    pub fn value_form(&self) -> ValueForm {
        self.plugin.value_form(&self.ctx)
    }

    pub fn label(&self, values: &[FilterValue]) -> String {
        self.plugin.label(&self.ctx, values)
    }

    pub fn entity_values(&self, items: &[FieldItem]) -> Vec<FilterValue> {
        self.plugin.entity_values(&self.ctx, items)
    }
}
