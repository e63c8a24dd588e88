pub mod entity;
pub mod schema;

pub use entity::{Entity, FieldItem};
pub use schema::{EntitySchema, FieldDefinition, StaticSchema, VocabularyKind};
