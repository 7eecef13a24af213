//! Runtime-loaded schemas
//!
//! Definition files describe records that are not known at compile time.
//! They compile into ordinary schemas over [`DynamicRecord`] and decode
//! with the same lenient rules as typed records.

mod loader;
mod record;
mod types;

pub use loader::{SchemaLoader, SchemaRegistry};
pub use record::{DynamicRecord, DynamicSchema};
pub use types::{FieldDef, FieldType, SchemaDef};
