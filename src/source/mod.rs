pub mod catalogue;
pub mod list_source;
pub mod options;

pub use catalogue::{CatalogueService, IndexRepository, ListSourceCatalogue};
pub use list_source::ListSource;
pub use options::{ConfigurationError, QueryOptions, DEFAULT_LIMIT};
