use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::SortClause;
use crate::mapping::{FieldMappingConfig, FieldNameMapper};
use crate::source::DEFAULT_LIMIT;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-bundle defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSettings {
    pub entity_type: String,
    pub bundle: String,
    #[serde(default)]
    pub default_sort: Option<SortClause>,
    /// Exposed facets for lists that do not override them.
    #[serde(default)]
    pub default_exposed_filters: Vec<String>,
}

// Serializable, comparable, explicit defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub default_limit: usize,
    pub field_mapping: FieldMappingConfig,
    pub bundles: Vec<BundleSettings>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            field_mapping: FieldMappingConfig::default(),
            bundles: Vec::new(),
        }
    }
}

impl EngineSettings {
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let f = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(f)?)
    }

    pub fn bundle(&self, entity_type: &str, bundle: &str) -> Option<&BundleSettings> {
        self.bundles
            .iter()
            .find(|b| b.entity_type == entity_type && b.bundle == bundle)
    }

    pub fn field_name_mapper(&self) -> FieldNameMapper {
        FieldNameMapper::new(self.field_mapping.clone())
    }
}
