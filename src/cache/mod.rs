pub mod dependencies;

pub use dependencies::{CacheableMetadata, ROUTE_CONTEXT};
