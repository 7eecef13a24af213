//! lenient-json - Lenient, schema-driven JSON decoding
//!
//! Decodes a JSON payload into a record. Required fields that are absent or
//! malformed fail the whole call; optional fields that fail to decode keep
//! their zero value and are reported as path-qualified warnings.
//!
//! Records come from two sources:
//! - Rust types implementing [`Record`] (see [`impl_record_decode!`])
//! - definition files loaded at runtime ([`dynamic::SchemaRegistry`])

pub mod cli;
pub mod config;
pub mod decode;
pub mod dynamic;
pub mod schema;

pub use config::{ConfigError, DecoderConfig, DEFAULT_MAX_DEPTH};
pub use decode::{
    decode, decode_record, decode_sequence, decode_serde, Decode, DecodeContext, DecodeError,
    DecodeErrorCode, DecodeResult, Decoder, Failure, FieldPath, Outcome, ParseWarning,
    PathSegment,
};
pub use schema::{
    FieldDescriptor, FieldKind, Record, Requirement, Schema, SchemaBuilder, SchemaError,
};

#[doc(hidden)]
pub use serde_json::value::RawValue;
