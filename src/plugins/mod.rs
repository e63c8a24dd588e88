//! Per-field-kind value handling for facets.
//!
//! A [`FieldTypePlugin`] knows how to read filter values out of entity field
//! items, how to label them and which form collects them. Plugins are
//! stateless; everything use-specific arrives through [`PluginContext`].

pub mod builtin;
pub mod registry;

use serde::{Deserialize, Serialize};

use crate::backend::FacetDescriptor;
use crate::entity::{FieldDefinition, FieldItem};
use crate::filter::PresetFilter;
use crate::source::ListSource;
use crate::types::FilterValue;

pub use builtin::{BooleanPlugin, DatePlugin, EntityReferencePlugin, FulltextPlugin, ListPlugin};
pub use registry::{ConfiguredPlugin, PluginRegistry, PluginResolutionMiss, PluginTier, ResolvedPlugin};

/// Human labels for referenced entities.
pub trait EntityLabels {
    fn label(&self, id: &str) -> Option<String>;
}

/// Everything a plugin may consult for one use.
#[derive(Clone, Copy)]
pub struct PluginContext<'a> {
    pub facet: &'a FacetDescriptor,
    pub preset_filter: Option<&'a PresetFilter>,
    pub list_source: &'a ListSource,
    /// Schema field backing the facet; `None` for processor-provided fields.
    pub field: Option<&'a FieldDefinition>,
    pub labels: Option<&'a dyn EntityLabels>,
}

/// Description of the widget that collects values for a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum FormWidget {
    Select { options: Vec<(String, String)>, multiple: bool },
    Autocomplete { target_facet: String },
    Checkbox,
    Date,
    Textfield,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueForm {
    pub title: String,
    pub widget: FormWidget,
    pub default_values: Vec<FilterValue>,
}

pub trait FieldTypePlugin: Send + Sync {
    fn id(&self) -> &'static str;

    /// Values the preset filter currently holds, normalized for this kind.
    fn default_values(&self, ctx: &PluginContext<'_>) -> Vec<FilterValue> {
        ctx.preset_filter
            .map(|f| f.values.clone())
            .unwrap_or_default()
    }

    fn value_form(&self, ctx: &PluginContext<'_>) -> ValueForm;

    fn label(&self, ctx: &PluginContext<'_>, values: &[FilterValue]) -> String {
        let _ = ctx;
        values
            .iter()
            .map(FilterValue::canonical)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Filter values carried by the items of an entity field.
    fn entity_values(&self, ctx: &PluginContext<'_>, items: &[FieldItem]) -> Vec<FilterValue>;
}
