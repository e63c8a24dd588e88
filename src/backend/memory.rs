//! In-memory backend that evaluates built queries over a fixed document set.
//!
//! It reads the same side-channel options a real facet pipeline would, so
//! preset, exposed and exclusion semantics can be exercised end to end.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use serde::Deserialize;
use tracing::debug;

use crate::backend::index::{datasource_id, FacetDescriptor};
use crate::backend::query::{
    BackendError, Condition, ConditionOperator, Query, ResultItem, ResultSet, SearchBackend,
    SortDirection, DATASOURCE_FIELD,
};
use crate::contextual::EXCLUDE_CONTEXT_ENTITY_KEY;
use crate::entity::Entity;
use crate::filter::{PresetFilter, PresetFilterSet};
use crate::source::options::{
    OPTION_EXPOSED_FILTERS, OPTION_EXTRA, OPTION_IGNORED_FILTERS, OPTION_PRESET_FILTERS,
};
use crate::types::FilterValue;

/// One indexed item.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub entity_type: String,
    pub entity_id: String,
    pub language: Option<String>,
    pub fields: BTreeMap<String, Vec<FilterValue>>,
    pub entity: Option<Entity>,
}

impl IndexedDocument {
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        let mut fields = BTreeMap::new();
        fields.insert(
            DATASOURCE_FIELD.to_string(),
            vec![FilterValue::String(datasource_id(&entity_type))],
        );

        Self {
            entity_type,
            entity_id: entity_id.into(),
            language: None,
            fields,
            entity: None,
        }
    }

    pub fn with_values(mut self, field: impl Into<String>, values: Vec<FilterValue>) -> Self {
        self.fields.insert(field.into(), values);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn item_id(&self) -> String {
        format!("{}/{}", datasource_id(&self.entity_type), self.entity_id)
    }

    fn values(&self, field: &str) -> &[FilterValue] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Deserialize)]
struct ExcludedEntity {
    id: String,
    entity_type: String,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: BTreeMap<String, Vec<IndexedDocument>>,
    facets: BTreeMap<String, FacetDescriptor>,
    failure: Option<BackendError>,
    calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_facets(mut self, facets: impl IntoIterator<Item = FacetDescriptor>) -> Self {
        for facet in facets {
            self.facets.insert(facet.id.clone(), facet);
        }
        self
    }

    pub fn index(&mut self, index_id: impl Into<String>, document: IndexedDocument) {
        self.documents.entry(index_id.into()).or_default().push(document);
    }

    /// Make every subsequent execution fail with `error`.
    pub fn fail_with(&mut self, error: BackendError) {
        self.failure = Some(error);
    }

    /// Number of times `execute` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn facet_field<'a>(&'a self, facet_id: &'a str) -> &'a str {
        self.facets
            .get(facet_id)
            .map(|f| f.field_identifier.as_str())
            .unwrap_or(facet_id)
    }

    fn matches(&self, query: &Query, side: &SideChannel, doc: &IndexedDocument) -> bool {
        if !query.conditions.iter().all(|c| condition_matches(c, doc.values(&c.field))) {
            return false;
        }

        if !query.languages.is_empty() {
            if let Some(language) = &doc.language {
                if !query.languages.contains(language) {
                    return false;
                }
            }
        }

        if !side
            .presets
            .iter()
            .all(|(_, filter)| filter.matches(doc.values(self.facet_field(&filter.facet_id))))
        {
            return false;
        }

        for (facet_id, values) in &side.exposed {
            if side.ignored.contains(facet_id) {
                continue;
            }
            let operator = self
                .facets
                .get(facet_id)
                .map(|f| f.query_operator)
                .unwrap_or_default();
            let filter = PresetFilter::new(facet_id.as_str(), operator, values.clone());
            if !filter.matches(doc.values(self.facet_field(facet_id))) {
                return false;
            }
        }

        match &side.excluded {
            Some(excluded) => !(excluded.entity_type == doc.entity_type && excluded.id == doc.entity_id),
            None => true,
        }
    }
}

/// Side-channel options decoded once per query.
struct SideChannel {
    presets: PresetFilterSet,
    ignored: BTreeSet<String>,
    exposed: BTreeMap<String, Vec<FilterValue>>,
    excluded: Option<ExcludedEntity>,
}

impl SideChannel {
    fn read(query: &Query) -> Result<Self, BackendError> {
        let extra: BTreeMap<String, serde_json::Value> = read_option(query, OPTION_EXTRA)?.unwrap_or_default();
        let excluded = extra
            .get(EXCLUDE_CONTEXT_ENTITY_KEY)
            .map(|raw| serde_json::from_value(raw.clone()))
            .transpose()
            .map_err(|e| BackendError::Execution(format!("malformed exclusion entry: {e}")))?;

        Ok(Self {
            presets: read_option(query, OPTION_PRESET_FILTERS)?.unwrap_or_default(),
            ignored: read_option(query, OPTION_IGNORED_FILTERS)?.unwrap_or_default(),
            exposed: read_option(query, OPTION_EXPOSED_FILTERS)?.unwrap_or_default(),
            excluded,
        })
    }
}

impl SearchBackend for MemoryBackend {
    fn execute(&self, query: &Query) -> Result<ResultSet, BackendError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let candidates = self
            .documents
            .get(&query.index_id)
            .ok_or_else(|| BackendError::Unavailable(format!("unknown index {}", query.index_id)))?;

        let side = SideChannel::read(query)?;
        let mut hits: Vec<&IndexedDocument> = candidates
            .iter()
            .filter(|doc| self.matches(query, &side, doc))
            .collect();

        hits.sort_by(|a, b| {
            for clause in &query.sorts {
                let ordering = compare_first(a.values(&clause.field), b.values(&clause.field));
                let ordering = match clause.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        let result_count = hits.len();
        let page = hits
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX));

        let items = page
            .map(|doc| ResultItem {
                id: doc.item_id(),
                entity: doc.entity.clone(),
            })
            .collect::<Vec<_>>();

        debug!(index = %query.index_id, result_count, returned = items.len(), "memory backend executed query");

        Ok(ResultSet { result_count, items })
    }
}

fn read_option<T: serde::de::DeserializeOwned>(query: &Query, key: &str) -> Result<Option<T>, BackendError> {
    query
        .option(key)
        .map(|raw| serde_json::from_value(raw.clone()))
        .transpose()
        .map_err(|e| BackendError::Execution(format!("malformed option {key}: {e}")))
}

fn condition_matches(condition: &Condition, present: &[FilterValue]) -> bool {
    let hit = condition
        .values
        .iter()
        .any(|v| present.iter().any(|p| p.same_as(v)));

    match condition.operator {
        ConditionOperator::Eq | ConditionOperator::In => hit,
        ConditionOperator::Ne | ConditionOperator::NotIn => !hit,
    }
}

// Missing values order after present ones before direction is applied.
fn compare_first(a: &[FilterValue], b: &[FilterValue]) -> Ordering {
    match (a.first(), b.first()) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
