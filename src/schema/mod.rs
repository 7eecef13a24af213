//! Record schemas
//!
//! A schema is built once per record type and never mutated afterwards, so
//! concurrent decode calls read it without synchronization.
//!
//! # Design Principles
//!
//! - Declaration order is resolution order
//! - Embedded fields carry no payload key of their own
//! - Payload keys and display names are unique within a record

mod builder;
mod errors;
mod types;

pub use builder::SchemaBuilder;
pub use errors::{SchemaError, SchemaResult};
pub use types::{FieldDescriptor, FieldKind, Record, Requirement, Schema};

pub(crate) use types::{Binding, EmbeddedBinder, ValueBinder};
