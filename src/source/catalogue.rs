use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::backend::{FacetDescriptor, IndexDescriptor};
use crate::source::list_source::ListSource;
use crate::types::SearchId;

/// Supplies the search configuration the catalogue is built from.
pub trait IndexRepository: Send + Sync {
    /// Every index; disabled ones are skipped by the catalogue.
    fn indexes(&self) -> Vec<IndexDescriptor>;

    fn facets(&self) -> Vec<FacetDescriptor>;

    /// All bundles of `entity_type`, used when a datasource selects none explicitly.
    fn bundles(&self, entity_type: &str) -> Vec<String> {
        let _ = entity_type;
        Vec::new()
    }
}

/// Immutable snapshot of every list source.
#[derive(Debug, Default)]
pub struct ListSourceCatalogue {
    by_bundle: BTreeMap<(String, String), Arc<ListSource>>,
}

impl ListSourceCatalogue {
    pub fn build(repository: &dyn IndexRepository) -> Self {
        let mut indexes = repository.indexes();
        indexes.sort_by(|a, b| a.id.cmp(&b.id));
        let facets = repository.facets();

        let mut by_bundle: BTreeMap<(String, String), Arc<ListSource>> = BTreeMap::new();

        for index in indexes.into_iter().filter(|i| i.enabled) {
            let index = Arc::new(index);

            for datasource in &index.datasources {
                let bundles = match (&datasource.bundle_key, datasource.bundles.is_empty()) {
                    (None, _) => vec![datasource.entity_type.clone()],
                    (Some(_), false) => datasource.bundles.clone(),
                    (Some(_), true) => repository.bundles(&datasource.entity_type),
                };

                for bundle in bundles {
                    let key = (datasource.entity_type.clone(), bundle.clone());
                    if let Some(existing) = by_bundle.get(&key) {
                        warn!(
                            entity_type = %datasource.entity_type,
                            bundle = %bundle,
                            kept = %existing.index().id,
                            skipped = %index.id,
                            "bundle indexed twice, keeping first index"
                        );
                        continue;
                    }

                    let source = ListSource::new(
                        datasource.entity_type.clone(),
                        bundle,
                        datasource.bundle_key.clone(),
                        Arc::clone(&index),
                    )
                    .with_facets(&facets);
                    by_bundle.insert(key, Arc::new(source));
                }
            }
        }

        info!(list_sources = by_bundle.len(), "built list source catalogue");

        Self { by_bundle }
    }

    pub fn get(&self, entity_type: &str, bundle: &str) -> Option<Arc<ListSource>> {
        self.by_bundle
            .get(&(entity_type.to_string(), bundle.to_string()))
            .cloned()
    }

    pub fn by_search_id(&self, search_id: &SearchId) -> Option<Arc<ListSource>> {
        self.by_bundle
            .values()
            .find(|s| s.search_id() == search_id)
            .cloned()
    }

    pub fn list_sources(&self) -> impl Iterator<Item = &Arc<ListSource>> {
        self.by_bundle.values()
    }

    pub fn len(&self) -> usize {
        self.by_bundle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_bundle.is_empty()
    }
}

/// Long-lived owner of the current catalogue snapshot.
///
/// Readers clone the `Arc` and never observe a partially rebuilt catalogue.
/// Reads are not lock-free: each takes the read lock for the length of an
/// `Arc` clone. Only the first build runs under the write lock; `rebuild`
/// builds outside it and holds the write lock just for the pointer swap.
pub struct CatalogueService {
    repository: Arc<dyn IndexRepository>,
    snapshot: RwLock<Option<Arc<ListSourceCatalogue>>>,
}

impl CatalogueService {
    pub fn new(repository: Arc<dyn IndexRepository>) -> Self {
        Self {
            repository,
            snapshot: RwLock::new(None),
        }
    }

    /// Current snapshot, built on first access.
    pub fn snapshot(&self) -> Arc<ListSourceCatalogue> {
        {
            let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
            if let Some(catalogue) = guard.as_ref() {
                return Arc::clone(catalogue);
            }
        }

        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        // Another reader may have built it while we waited for the write lock.
        if let Some(catalogue) = guard.as_ref() {
            return Arc::clone(catalogue);
        }
        let catalogue = Arc::new(ListSourceCatalogue::build(self.repository.as_ref()));
        *guard = Some(Arc::clone(&catalogue));
        catalogue
    }

    /// Build a fresh snapshot and swap it in whole.
    pub fn rebuild(&self) -> Arc<ListSourceCatalogue> {
        let catalogue = Arc::new(ListSourceCatalogue::build(self.repository.as_ref()));
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Arc::clone(&catalogue));
        catalogue
    }

    /// Index configuration changed: replace the snapshot.
    pub fn on_index_changed(&self) {
        self.rebuild();
    }

    pub fn get(&self, entity_type: &str, bundle: &str) -> Option<Arc<ListSource>> {
        self.snapshot().get(entity_type, bundle)
    }
}
