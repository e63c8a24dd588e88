use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::FilterValue;

/// One item of a multi-valued entity field: property name to value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldItem {
    inner: BTreeMap<String, FilterValue>,
}

impl FieldItem {
    pub fn new() -> Self {
        FieldItem {
            inner: BTreeMap::new(),
        }
    }

    /// Shorthand for an item holding a single property.
    pub fn with(property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        let mut item = FieldItem::new();
        item.insert(property, value);
        item
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<FilterValue>) {
        self.inner.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&FilterValue> {
        self.inner.get(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.inner.iter()
    }
}

/// A loaded content entity, as handed over by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: String,
    pub bundle: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    fields: BTreeMap<String, Vec<FieldItem>>,
}

impl Entity {
    pub fn new(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            label: String::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, items: Vec<FieldItem>) -> Self {
        self.fields.insert(name.into(), items);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, items: Vec<FieldItem>) {
        self.fields.insert(name.into(), items);
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Items of `name`; a missing field reads as empty.
    pub fn field_items(&self, name: &str) -> &[FieldItem] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cache tag identifying this entity for invalidation.
    pub fn cache_tag(&self) -> String {
        format!("{}:{}", self.entity_type, self.id)
    }
}
