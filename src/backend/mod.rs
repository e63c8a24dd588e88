pub mod index;
pub mod memory;
pub mod query;

pub use index::{
    datasource_id, DatasourceDescriptor, FacetDescriptor, IndexDescriptor, IndexField,
    ProcessorDescriptor,
};
pub use memory::{IndexedDocument, MemoryBackend};
pub use query::{
    BackendError, Condition, ConditionOperator, Query, ResultItem, ResultSet, SearchBackend,
    SortClause, SortDirection, DATASOURCE_FIELD,
};
