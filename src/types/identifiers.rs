use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifier of a list source, derived from its (entity type, bundle) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchId(String);

impl SearchId {
    pub fn for_bundle(entity_type: &str, bundle: &str) -> Self {
        SearchId(format!("list_source:{entity_type}:{bundle}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a preset filter inside one configuration.
///
/// Only meaningful within the filter set it was generated against; two
/// independent edit sessions may assign different ids to the same facet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(String);

impl FilterId {
    pub fn new(raw: impl Into<String>) -> Self {
        FilterId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a filter id for `facet_id` that is absent from `existing`.
///
/// The first candidate is `sha256(facet_id)`. On collision the facet id is
/// salted with an incrementing attempt counter until the id is free.
pub fn generate_filter_id(facet_id: &str, existing: &BTreeSet<FilterId>) -> FilterId {
    let mut candidate = FilterId(sha256_hex(facet_id.as_bytes()));
    let mut attempt: u64 = 0;

    while existing.contains(&candidate) {
        attempt += 1;
        candidate = FilterId(sha256_hex(format!("{facet_id}{attempt}").as_bytes()));
    }

    candidate
}

/// Stable hash of a serialized configuration, used as a memoization key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }

        Fingerprint(format!("sha256:{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}
