use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Cache context varying by the current route.
pub const ROUTE_CONTEXT: &str = "route";

/// Dependencies collected while resolving a list, for downstream invalidation.
///
/// Append-only. Recording never influences resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheableMetadata {
    tags: BTreeSet<String>,
    contexts: BTreeSet<String>,
}

impl CacheableMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn add_context(&mut self, context: impl Into<String>) {
        self.contexts.insert(context.into());
    }

    /// Record a read of configuration object `name`.
    pub fn add_config(&mut self, name: &str) {
        self.tags.insert(format!("config:{name}"));
    }

    pub fn merge(&mut self, other: &CacheableMetadata) {
        self.tags.extend(other.tags.iter().cloned());
        self.contexts.extend(other.contexts.iter().cloned());
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn contexts(&self) -> &BTreeSet<String> {
        &self.contexts
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_context(&self, context: &str) -> bool {
        self.contexts.contains(context)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.contexts.is_empty()
    }
}
