//! Lenient decoding subsystem
//!
//! Decodes JSON into typed records while keeping two error channels apart:
//!
//! - fatal errors abort the whole call (required field missing, or a
//!   non-optional field that fails to decode)
//! - warnings are collected for optional fields that fail to decode; the
//!   field keeps its zero value and decoding continues
//!
//! # Design Principles
//!
//! - Fields resolve strictly in declaration order
//! - Only `Required` enforces presence; only `Optional` tolerates failure
//! - Error paths are re-homed at every frame (`Outer.Inner.Field`)
//! - An empty warning set is a clean success, never a failure
//! - Schemas are immutable and shared; all other state is per call

mod context;
mod errors;
mod outcome;
mod primitive;
mod raw;
pub(crate) mod resolver;
mod warning;

pub use context::DecodeContext;
pub use errors::{DecodeError, DecodeErrorCode, DecodeResult, FieldPath, PathSegment};
pub use outcome::{Failure, Outcome};
pub use primitive::{decode_sequence, decode_serde, Decode};
pub use raw::{parse_payload, PayloadShape, RawMapping};
pub use resolver::decode_record;
pub use warning::ParseWarning;

use tracing::debug;

use crate::config::DecoderConfig;
use crate::schema::Record;

use resolver::resolve_fields;

/// Decodes `payload` into a fresh `T` with the default configuration.
pub fn decode<T: Decode>(payload: &[u8]) -> Outcome<T> {
    Decoder::default().decode(payload)
}

/// Entry point for decode calls sharing one configuration.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes `payload` into a fresh `T`.
    ///
    /// Non-record targets go straight to the primitive decoder; records
    /// are split and resolved field by field.
    pub fn decode<T: Decode>(&self, payload: &[u8]) -> Outcome<T> {
        let target = T::type_name();
        let raw = match parse_payload(payload, &target) {
            Ok(raw) => raw,
            Err(err) => return Outcome::Fatal(err),
        };

        let outcome = T::decode_raw(raw, &mut DecodeContext::new(&self.config));
        log_outcome(&target, &outcome);
        outcome
    }

    /// Decodes `payload` into an existing record.
    ///
    /// Fields absent from the payload keep their current values. After a
    /// fatal error the fields resolved before the failure have already been
    /// overwritten.
    pub fn decode_into<R: Record>(&self, payload: &[u8], target: &mut R) -> Outcome<()> {
        let schema = R::schema();
        let result = parse_payload(payload, schema.name())
            .and_then(|raw| RawMapping::split(raw, schema.name()))
            .and_then(|mapping| {
                let mut cx = DecodeContext::new(&self.config);
                cx.descend(schema.name(), |cx| resolve_fields(target, &mapping, schema, cx))
            })
            .map(|warnings| ((), warnings));

        let outcome = Outcome::from(result);
        log_outcome(schema.name(), &outcome);
        outcome
    }
}

pub(crate) fn log_outcome<T>(target: &str, outcome: &Outcome<T>) {
    match outcome {
        Outcome::Clean(_) => debug!(target_type = target, "decode complete"),
        Outcome::Warned(_, warnings) => debug!(
            target_type = target,
            warnings = warnings.len(),
            "decode complete with parse warnings"
        ),
        Outcome::Fatal(err) => debug!(
            target_type = target,
            code = err.code().code(),
            error = %err,
            "decode failed"
        ),
    }
}
