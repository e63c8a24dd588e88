use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of taxonomy a reference field points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyKind {
    /// Terms stored with parent links.
    TermTree,
    /// Concepts stored with explicit narrower links.
    ConceptScheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub entity_type: String,
    /// `None` for base fields shared by every bundle.
    #[serde(default)]
    pub bundle: Option<String>,
    pub field_type: String,
    #[serde(default)]
    pub target_vocabulary: Option<VocabularyKind>,
    /// Allowed values for list fields: stored key to human label.
    #[serde(default)]
    pub allowed_values: BTreeMap<String, String>,
}

impl FieldDefinition {
    pub fn base(
        entity_type: impl Into<String>,
        name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            bundle: None,
            field_type: field_type.into(),
            target_vocabulary: None,
            allowed_values: BTreeMap::new(),
        }
    }

    pub fn bundle(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            bundle: Some(bundle.into()),
            ..Self::base(entity_type, name, field_type)
        }
    }

    pub fn with_vocabulary(mut self, kind: VocabularyKind) -> Self {
        self.target_vocabulary = Some(kind);
        self
    }

    pub fn with_allowed_value(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.allowed_values.insert(key.into(), label.into());
        self
    }

    fn applies_to(&self, entity_type: &str, bundle: &str) -> bool {
        self.entity_type == entity_type
            && self.bundle.as_deref().map_or(true, |b| b == bundle)
    }
}

/// Field definitions of the content model.
pub trait EntitySchema {
    fn field_definition(&self, entity_type: &str, bundle: &str, name: &str) -> Option<&FieldDefinition>;
}

/// Schema held in memory, typically assembled at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    definitions: Vec<FieldDefinition>,
}

impl StaticSchema {
    pub fn new(definitions: Vec<FieldDefinition>) -> Self {
        Self { definitions }
    }

    pub fn push(&mut self, definition: FieldDefinition) {
        self.definitions.push(definition);
    }
}

impl EntitySchema for StaticSchema {
    fn field_definition(&self, entity_type: &str, bundle: &str, name: &str) -> Option<&FieldDefinition> {
        self.definitions
            .iter()
            .find(|d| d.name == name && d.applies_to(entity_type, bundle))
    }
}
