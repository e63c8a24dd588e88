pub mod preset;
pub mod set;

pub use preset::{ContextualFilter, FilterSource, Operator, PresetFilter};
pub use set::PresetFilterSet;
