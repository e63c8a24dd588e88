//! Running configured lists against the search backend, once per request.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, trace};

use crate::backend::{BackendError, Query, ResultSet, SearchBackend, SortClause};
use crate::cache::CacheableMetadata;
use crate::config::{EngineSettings, ListPageConfiguration};
use crate::contextual::{ContextualFilterResolver, InapplicableFilter};
use crate::entity::Entity;
use crate::source::{CatalogueService, ListSource, QueryOptions};
use crate::types::{FilterValue, Fingerprint};

#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Inapplicable(#[from] InapplicableFilter),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// What the current request contributes to list execution.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub context_entity: Option<Entity>,
    /// Active exposed filter values chosen by the visitor, per facet.
    pub exposed_values: BTreeMap<String, Vec<FilterValue>>,
    /// Sort picked by the visitor; only used by lists exposing the sort.
    pub sort_override: Option<SortClause>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_entity(mut self, entity: Entity) -> Self {
        self.context_entity = Some(entity);
        self
    }

    pub fn with_exposed_values(mut self, facet_id: impl Into<String>, values: Vec<FilterValue>) -> Self {
        self.exposed_values.insert(facet_id.into(), values);
        self
    }
}

#[derive(Debug)]
pub struct ExecutionResult {
    pub query: Query,
    pub result_set: ResultSet,
    pub list_source: Arc<ListSource>,
    /// The configuration after contextual resolution.
    pub configuration: ListPageConfiguration,
    /// Informational only.
    pub executed_at: DateTime<Utc>,
}

pub struct ListExecutionEngine<B> {
    catalogue: Arc<CatalogueService>,
    resolver: ContextualFilterResolver,
    backend: B,
    settings: EngineSettings,
}

impl<B: SearchBackend> ListExecutionEngine<B> {
    pub fn new(
        catalogue: Arc<CatalogueService>,
        resolver: ContextualFilterResolver,
        backend: B,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalogue,
            resolver,
            backend,
            settings,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalogue(&self) -> &CatalogueService {
        &self.catalogue
    }

    pub fn resolver(&self) -> &ContextualFilterResolver {
        &self.resolver
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Start a request scope. Memoized results live as long as it does.
    pub fn begin_request(&self, request: RequestContext) -> ListExecution<'_, B> {
        ListExecution {
            engine: self,
            request,
            executed: BTreeMap::new(),
            cacheability: CacheableMetadata::new(),
        }
    }

    /// Query options for an already resolved configuration.
    pub fn build_options(
        &self,
        configuration: &ListPageConfiguration,
        list_source: &ListSource,
        request: &RequestContext,
    ) -> QueryOptions {
        let bundle = self
            .settings
            .bundle(&configuration.entity_type, &configuration.bundle);

        let mut sort: Vec<SortClause> = Vec::new();
        if configuration.exposed_sort {
            sort.extend(request.sort_override.iter().cloned());
        }
        for clause in configuration
            .sort
            .iter()
            .chain(bundle.and_then(|b| b.default_sort.as_ref()))
        {
            if !sort.iter().any(|s| s.field == clause.field) {
                sort.push(clause.clone());
            }
        }

        let exposed: BTreeSet<&str> = if configuration.exposed_filters_overridden {
            configuration.exposed_filters.iter().map(String::as_str).collect()
        } else {
            bundle
                .map(|b| b.default_exposed_filters.iter().map(String::as_str).collect())
                .unwrap_or_default()
        };

        let exposed_filters = request
            .exposed_values
            .iter()
            .filter(|(facet, values)| exposed.contains(facet.as_str()) && !values.is_empty())
            .map(|(facet, values)| (facet.clone(), values.clone()))
            .collect();

        let ignored_filters = list_source
            .available_filters()
            .into_keys()
            .filter(|facet| !exposed.contains(facet.as_str()))
            .collect();

        QueryOptions {
            limit: configuration.limit.unwrap_or(self.settings.default_limit),
            page: configuration.page,
            languages: configuration.languages.clone(),
            sort,
            ignored_filters,
            preset_filters: configuration.default_filter_values.clone(),
            exposed_filters,
            extra: configuration.extra.clone(),
        }
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Executed(Arc<ExecutionResult>),
    NoListSource,
    Inapplicable(InapplicableFilter),
}

/// One request's view of the engine.
///
/// Each distinct configuration fingerprint runs at most once; later calls
/// replay the first outcome.
pub struct ListExecution<'a, B> {
    engine: &'a ListExecutionEngine<B>,
    request: RequestContext,
    executed: BTreeMap<Fingerprint, Outcome>,
    cacheability: CacheableMetadata,
}

impl<'a, B: SearchBackend> ListExecution<'a, B> {
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    /// Cache dependencies recorded by every execution so far.
    pub fn cacheability(&self) -> &CacheableMetadata {
        &self.cacheability
    }

    /// Execute `configuration`, or return the result memoized for its fingerprint.
    ///
    /// `Ok(None)` means no list source exists for the configured bundle.
    pub fn execute_list(
        &mut self,
        configuration: &ListPageConfiguration,
    ) -> Result<Option<Arc<ExecutionResult>>, ExecutionError> {
        let fingerprint = configuration.fingerprint();

        if let Some(outcome) = self.executed.get(&fingerprint) {
            trace!(fingerprint = %fingerprint, "list already executed in this request");
            return match outcome {
                Outcome::Executed(result) => Ok(Some(Arc::clone(result))),
                Outcome::NoListSource => Ok(None),
                Outcome::Inapplicable(err) => Err(err.clone().into()),
            };
        }

        let list_source = configuration.list_source().cloned().or_else(|| {
            self.engine
                .catalogue
                .get(&configuration.entity_type, &configuration.bundle)
        });
        let Some(list_source) = list_source else {
            debug!(
                entity_type = %configuration.entity_type,
                bundle = %configuration.bundle,
                "no list source for bundle"
            );
            self.executed.insert(fingerprint, Outcome::NoListSource);
            return Ok(None);
        };

        let processed = match self.engine.resolver.process_configuration(
            configuration,
            &list_source,
            self.request.context_entity.as_ref(),
            &mut self.cacheability,
        ) {
            Ok(processed) => processed,
            Err(err) => {
                self.executed
                    .insert(fingerprint, Outcome::Inapplicable(err.clone()));
                return Err(err.into());
            }
        };

        let options = self
            .engine
            .build_options(&processed, &list_source, &self.request);
        let query = list_source.get_query(&options);
        let result_set = self.engine.backend.execute(&query)?;

        debug!(
            fingerprint = %fingerprint,
            search_id = %list_source.search_id(),
            result_count = result_set.result_count,
            "executed list"
        );

        let result = Arc::new(ExecutionResult {
            query,
            result_set,
            list_source,
            configuration: processed,
            executed_at: Utc::now(),
        });
        self.executed
            .insert(fingerprint, Outcome::Executed(Arc::clone(&result)));

        Ok(Some(result))
    }
}
