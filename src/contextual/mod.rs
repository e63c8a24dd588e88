pub mod processor;
pub mod resolver;

pub use processor::{ContextualProcessor, ContextualProcessors};
pub use resolver::{ContextualFilterResolver, InapplicableFilter, EXCLUDE_CONTEXT_ENTITY_KEY};
