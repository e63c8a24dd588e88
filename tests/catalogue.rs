mod common;

use std::sync::{Arc, Mutex};

use facet_lists::backend::{DatasourceDescriptor, FacetDescriptor, IndexDescriptor};
use facet_lists::source::{CatalogueService, IndexRepository, ListSourceCatalogue};
use facet_lists::types::SearchId;

use common::{facets, index, FixtureRepository, ARTICLE_SOURCE};

/// Repository whose contents can change between catalogue builds.
struct MutableRepository {
    indexes: Mutex<Vec<IndexDescriptor>>,
    facets: Vec<FacetDescriptor>,
    bundles: Vec<String>,
}

impl IndexRepository for MutableRepository {
    fn indexes(&self) -> Vec<IndexDescriptor> {
        self.indexes.lock().expect("lock").clone()
    }

    fn facets(&self) -> Vec<FacetDescriptor> {
        self.facets.clone()
    }

    fn bundles(&self, entity_type: &str) -> Vec<String> {
        if entity_type == "media" {
            self.bundles.clone()
        } else {
            Vec::new()
        }
    }
}

#[test]
fn search_id_is_derived_from_entity_type_and_bundle() {
    assert_eq!(SearchId::for_bundle("node", "article").as_str(), ARTICLE_SOURCE);
    assert_eq!(SearchId::for_bundle("node", "article"), SearchId::for_bundle("node", "article"));
    assert_ne!(SearchId::for_bundle("node", "article"), SearchId::for_bundle("node", "page"));
}

#[test]
fn one_list_source_per_indexed_bundle() {
    let catalogue = ListSourceCatalogue::build(&FixtureRepository {
        indexes: vec![index()],
        facets: facets(),
    });

    assert_eq!(catalogue.len(), 2);

    let article = catalogue.get("node", "article").expect("article source");
    assert_eq!(article.search_id().as_str(), ARTICLE_SOURCE);
    assert_eq!(article.bundle_key(), Some("type"));
    assert_eq!(article.index().id, "content");

    let filters = article.available_filters();
    assert_eq!(
        filters.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["created", "parents", "tags", "topic"]
    );
    assert_eq!(filters["topic"], "Topic");

    let page = catalogue.get("node", "page").expect("page source");
    assert_eq!(page.available_filters().len(), 1);

    assert!(catalogue.get("node", "event").is_none());
    assert!(catalogue
        .by_search_id(&SearchId::for_bundle("node", "page"))
        .is_some());
}

#[test]
fn disabled_indexes_are_skipped_and_first_index_wins() {
    let mut disabled = index();
    disabled.id = "aaa_disabled".to_string();
    disabled.enabled = false;

    let mut duplicate = index();
    duplicate.id = "zzz_duplicate".to_string();

    let catalogue = ListSourceCatalogue::build(&FixtureRepository {
        indexes: vec![duplicate, disabled, index()],
        facets: facets(),
    });

    assert_eq!(catalogue.len(), 2);
    for source in catalogue.list_sources() {
        assert_eq!(source.index().id, "content");
    }
}

#[test]
fn unselected_bundles_come_from_the_repository() {
    let repository = MutableRepository {
        indexes: Mutex::new(vec![IndexDescriptor::new("media").with_datasource(DatasourceDescriptor {
            entity_type: "media".to_string(),
            bundles: Vec::new(),
            bundle_key: Some("bundle".to_string()),
        })]),
        facets: Vec::new(),
        bundles: vec!["image".to_string(), "video".to_string()],
    };

    let catalogue = ListSourceCatalogue::build(&repository);
    assert!(catalogue.get("media", "image").is_some());
    assert!(catalogue.get("media", "video").is_some());
    assert_eq!(catalogue.len(), 2);
}

#[test]
fn snapshot_is_built_once_and_swapped_on_rebuild() {
    let repository = Arc::new(MutableRepository {
        indexes: Mutex::new(vec![index()]),
        facets: facets(),
        bundles: Vec::new(),
    });
    let service = CatalogueService::new(repository.clone());

    let first = service.snapshot();
    let again = service.snapshot();
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(first.len(), 2);

    repository.indexes.lock().expect("lock").clear();
    // Still the old snapshot until told otherwise.
    assert_eq!(service.snapshot().len(), 2);

    service.on_index_changed();
    let rebuilt = service.snapshot();
    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert!(rebuilt.is_empty());

    // Readers holding the old snapshot are unaffected.
    assert_eq!(first.len(), 2);
    assert!(first.get("node", "article").is_some());
}

#[test]
fn readers_see_a_complete_snapshot_during_rebuilds() {
    let repository = Arc::new(MutableRepository {
        indexes: Mutex::new(vec![index()]),
        facets: facets(),
        bundles: Vec::new(),
    });
    let service = CatalogueService::new(repository.clone());
    assert_eq!(service.snapshot().len(), 2);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let snapshot = service.snapshot();
                    match snapshot.len() {
                        0 => assert!(snapshot.get("node", "article").is_none()),
                        2 => assert!(snapshot.get("node", "article").is_some()),
                        n => panic!("partial catalogue with {n} sources"),
                    }
                }
            });
        }
        for round in 0..20 {
            let next = if round % 2 == 0 { Vec::new() } else { vec![index()] };
            *repository.indexes.lock().expect("lock") = next;
            service.on_index_changed();
        }
    });
}
