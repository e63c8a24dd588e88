#![allow(dead_code)]

use std::sync::Arc;

use facet_lists::backend::{
    DatasourceDescriptor, FacetDescriptor, IndexDescriptor, IndexField, IndexedDocument,
    MemoryBackend, ProcessorDescriptor,
};
use facet_lists::config::EngineSettings;
use facet_lists::contextual::ContextualFilterResolver;
use facet_lists::entity::{Entity, FieldDefinition, FieldItem, StaticSchema, VocabularyKind};
use facet_lists::execution::ListExecutionEngine;
use facet_lists::filter::Operator;
use facet_lists::hierarchy::{HierarchyBackends, Term, TermTree};
use facet_lists::mapping::{FieldMappingConfig, FieldNameMapper};
use facet_lists::plugins::PluginRegistry;
use facet_lists::source::{CatalogueService, IndexRepository, ListSource};
use facet_lists::types::FilterValue;

pub const INDEX: &str = "content";
pub const ARTICLE_SOURCE: &str = "list_source:node:article";
pub const PAGE_SOURCE: &str = "list_source:node:page";
pub const LANGUAGE_FIELD: &str = "language_with_fallback";

pub fn field(id: &str, data_type: &str, property_path: &str) -> IndexField {
    IndexField {
        id: id.to_string(),
        label: id.to_string(),
        data_type: data_type.to_string(),
        property_path: property_path.to_string(),
    }
}

pub fn index() -> IndexDescriptor {
    let mut index = IndexDescriptor::new(INDEX)
        .with_datasource(DatasourceDescriptor {
            entity_type: "node".to_string(),
            bundles: vec!["article".to_string(), "page".to_string()],
            bundle_key: Some("type".to_string()),
        })
        .with_field(field("type", "string", "type"))
        .with_field(field("topic", "integer", "field_topic"))
        .with_field(field("tags", "string", "field_tags"))
        .with_field(field("created", "date", "created"))
        .with_field(field("parents", "string", "topic_parents"))
        .with_processor(ProcessorDescriptor {
            id: "topic_parents".to_string(),
            stages: vec!["add_properties".to_string()],
            property_paths: vec!["topic_parents".to_string()],
        });
    index.language_fallback_field = Some(LANGUAGE_FIELD.to_string());
    index
}

pub fn facets() -> Vec<FacetDescriptor> {
    vec![
        FacetDescriptor::new("topic", "topic", ARTICLE_SOURCE)
            .with_label("Topic")
            .with_hierarchy(),
        FacetDescriptor::new("tags", "tags", ARTICLE_SOURCE)
            .with_label("Tags")
            .with_query_operator(Operator::And),
        FacetDescriptor::new("created", "created", ARTICLE_SOURCE).with_label("Created"),
        FacetDescriptor::new("parents", "parents", ARTICLE_SOURCE).with_label("Parents"),
        FacetDescriptor::new("page_tags", "tags", PAGE_SOURCE).with_label("Tags"),
    ]
}

pub fn schema() -> StaticSchema {
    StaticSchema::new(vec![
        FieldDefinition::base("node", "created", "created"),
        FieldDefinition::bundle("node", "article", "field_topic", "entity_reference")
            .with_vocabulary(VocabularyKind::TermTree),
        FieldDefinition::bundle("node", "article", "field_tags", "list_string")
            .with_allowed_value("red", "Red")
            .with_allowed_value("blue", "Blue"),
        FieldDefinition::bundle("node", "page", "field_subject", "entity_reference"),
        FieldDefinition::bundle("node", "page", "field_tags", "list_string"),
    ])
}

/// 1 -> 2 -> 3, and a separate root 4.
pub fn terms() -> TermTree {
    TermTree::new(vec![
        Term { id: "1".into(), parent: None, weight: 0 },
        Term { id: "2".into(), parent: Some("1".into()), weight: 0 },
        Term { id: "3".into(), parent: Some("2".into()), weight: 0 },
        Term { id: "4".into(), parent: None, weight: 0 },
    ])
}

pub struct FixtureRepository {
    pub indexes: Vec<IndexDescriptor>,
    pub facets: Vec<FacetDescriptor>,
}

impl IndexRepository for FixtureRepository {
    fn indexes(&self) -> Vec<IndexDescriptor> {
        self.indexes.clone()
    }

    fn facets(&self) -> Vec<FacetDescriptor> {
        self.facets.clone()
    }
}

pub fn catalogue() -> Arc<CatalogueService> {
    Arc::new(CatalogueService::new(Arc::new(FixtureRepository {
        indexes: vec![index()],
        facets: facets(),
    })))
}

pub fn article_source() -> Arc<ListSource> {
    catalogue()
        .get("node", "article")
        .expect("article list source")
}

pub fn strings(values: &[&str]) -> Vec<FilterValue> {
    values.iter().map(|v| FilterValue::from(*v)).collect()
}

pub fn ints(values: &[i64]) -> Vec<FilterValue> {
    values.iter().map(|v| FilterValue::from(*v)).collect()
}

pub fn article(id: &str, topic: &[i64], tags: &[&str]) -> IndexedDocument {
    IndexedDocument::new("node", id)
        .with_values("type", strings(&["article"]))
        .with_values("topic", ints(topic))
        .with_values("tags", strings(tags))
        .with_values("created", strings(&[&format!("2024-01-0{id}")]))
        .with_values(LANGUAGE_FIELD, strings(&["en"]))
        .with_language("en")
}

pub fn backend() -> MemoryBackend {
    let mut backend = MemoryBackend::new().with_facets(facets());
    backend.index(INDEX, article("1", &[1], &["red"]));
    backend.index(INDEX, article("2", &[2], &["red", "blue"]));
    backend.index(INDEX, article("3", &[3], &["blue"]));
    backend.index(INDEX, article("4", &[4], &["red", "blue", "green"]));
    backend.index(
        INDEX,
        IndexedDocument::new("node", "9")
            .with_values("type", strings(&["page"]))
            .with_values("tags", strings(&["red"])),
    );
    backend
}

pub fn resolver() -> ContextualFilterResolver {
    let mapper = FieldNameMapper::new(FieldMappingConfig::new().with_alias("field_topic", "field_subject"));
    ContextualFilterResolver::new(Arc::new(schema()), PluginRegistry::with_defaults(), mapper)
        .with_hierarchies(HierarchyBackends::new().with(VocabularyKind::TermTree, terms().into_hierarchy()))
}

pub fn engine_with(backend: MemoryBackend, settings: EngineSettings) -> ListExecutionEngine<MemoryBackend> {
    ListExecutionEngine::new(catalogue(), resolver(), backend, settings)
}

pub fn engine() -> ListExecutionEngine<MemoryBackend> {
    engine_with(backend(), EngineSettings::default())
}

pub fn reference(ids: &[i64]) -> Vec<FieldItem> {
    ids.iter().map(|id| FieldItem::with("target_id", *id)).collect()
}

/// An article node used as context, tagged with topic 2.
pub fn context_article() -> Entity {
    Entity::new("node", "article", "2")
        .with_label("Context article")
        .with_field("field_topic", reference(&[2]))
        .with_field("field_tags", vec![FieldItem::with("value", "blue")])
}
