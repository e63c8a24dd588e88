pub mod identifiers;
pub mod value;

pub use identifiers::{generate_filter_id, FilterId, Fingerprint, SearchId};
pub use value::FilterValue;
