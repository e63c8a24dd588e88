use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::Operator;

/// Entity type and selected bundles indexed by one datasource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceDescriptor {
    pub entity_type: String,
    /// Empty means every bundle of the entity type.
    #[serde(default)]
    pub bundles: Vec<String>,
    /// Property holding the bundle, absent for bundle-less entity types.
    #[serde(default)]
    pub bundle_key: Option<String>,
}

impl DatasourceDescriptor {
    pub fn id(&self) -> String {
        datasource_id(&self.entity_type)
    }
}

pub fn datasource_id(entity_type: &str) -> String {
    format!("entity:{entity_type}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Declared search data type, e.g. `string`, `integer`, `date`.
    pub data_type: String,
    /// Path of the indexed property, e.g. `field_topic` or `field_topic:entity:name`.
    pub property_path: String,
}

impl IndexField {
    /// Name of the entity field the property path starts at.
    pub fn field_name(&self) -> &str {
        self.property_path
            .split(':')
            .next()
            .unwrap_or(self.property_path.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorDescriptor {
    pub id: String,
    /// Pipeline stages the processor runs in.
    #[serde(default)]
    pub stages: Vec<String>,
    /// Property paths this processor provides values for.
    #[serde(default)]
    pub property_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub id: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    pub datasources: Vec<DatasourceDescriptor>,
    #[serde(default)]
    pub fields: BTreeMap<String, IndexField>,
    #[serde(default)]
    pub processors: Vec<ProcessorDescriptor>,
    /// Field holding the item language with fallback applied, if indexed.
    #[serde(default)]
    pub language_fallback_field: Option<String>,
}

fn enabled_default() -> bool {
    true
}

impl IndexDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            datasources: Vec::new(),
            fields: BTreeMap::new(),
            processors: Vec::new(),
            language_fallback_field: None,
        }
    }

    pub fn with_datasource(mut self, datasource: DatasourceDescriptor) -> Self {
        self.datasources.push(datasource);
        self
    }

    pub fn with_field(mut self, field: IndexField) -> Self {
        self.fields.insert(field.id.clone(), field);
        self
    }

    pub fn with_processor(mut self, processor: ProcessorDescriptor) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn field(&self, id: &str) -> Option<&IndexField> {
        self.fields.get(id)
    }

    /// Processor backing `property_path`, if the property is processor-provided.
    pub fn processor_for(&self, property_path: &str) -> Option<&ProcessorDescriptor> {
        self.processors
            .iter()
            .find(|p| p.property_paths.iter().any(|path| path == property_path))
    }
}

/// A filterable dimension exposed over an index field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetDescriptor {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Index field the facet filters on.
    pub field_identifier: String,
    #[serde(default)]
    pub widget: String,
    /// Search id of the list source the facet belongs to.
    pub facet_source: String,
    #[serde(default)]
    pub processors: Vec<String>,
    /// How several active values of this facet combine.
    #[serde(default)]
    pub query_operator: Operator,
    /// Whether selected values also match their descendants.
    #[serde(default)]
    pub hierarchy: bool,
}

impl FacetDescriptor {
    pub fn new(
        id: impl Into<String>,
        field_identifier: impl Into<String>,
        facet_source: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            field_identifier: field_identifier.into(),
            widget: "links".to_string(),
            facet_source: facet_source.into(),
            processors: Vec::new(),
            query_operator: Operator::Or,
            hierarchy: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_query_operator(mut self, operator: Operator) -> Self {
        self.query_operator = operator;
        self
    }

    pub fn with_hierarchy(mut self) -> Self {
        self.hierarchy = true;
        self
    }
}
