//! Field resolution
//!
//! Walks a record schema in declaration order against one level of raw
//! mapping. Each field ends in exactly one of:
//!
//! - committed (decoded, possibly carrying nested warnings)
//! - left at its zero value (absent and not required)
//! - demoted to a warning (decode failed on an optional field)
//! - fatal (required field absent, or decode failed on a non-optional field)
//!
//! Fatal errors abort the walk immediately and discard warnings collected
//! so far. Warnings only move upward by explicit merge at each frame.

use serde_json::value::RawValue;
use tracing::{debug, trace};

use crate::schema::{Binding, Record, Schema};

use super::context::DecodeContext;
use super::errors::{DecodeError, DecodeResult};
use super::outcome::Outcome;
use super::raw::RawMapping;
use super::warning::ParseWarning;

/// Resolves every field of `schema` into `record`.
///
/// Embedded fields recurse on the same mapping and are treated as direct
/// members of `record`: their errors and warnings are not re-homed.
pub(crate) fn resolve_fields<R>(
    record: &mut R,
    raw: &RawMapping<'_>,
    schema: &Schema<R>,
    cx: &mut DecodeContext,
) -> DecodeResult<ParseWarning> {
    let mut warnings = ParseWarning::new();

    for field in schema.fields() {
        let (key, bind) = match &field.binding {
            Binding::Embedded(bind) => {
                warnings.merge(bind(record, raw, cx)?);
                continue;
            }
            Binding::Value { key, bind } => (key, bind),
        };

        let Some(fragment) = raw.get(key) else {
            if field.requirement.enforces_presence() {
                return Err(DecodeError::missing_required(
                    schema.name(),
                    field.display_name(),
                    field.type_name(),
                ));
            }
            continue;
        };

        trace!(record = schema.name(), field = field.display_name(), "resolving field");

        match bind(record, fragment, cx) {
            Outcome::Clean(()) => {}
            Outcome::Warned((), nested) => {
                warnings.merge_nested(field.display_name(), schema.name(), nested);
            }
            Outcome::Fatal(err) if field.requirement.tolerates_failure() => {
                debug!(
                    record = schema.name(),
                    field = field.display_name(),
                    error = %err,
                    "optional field failed to decode, recording warning"
                );
                warnings.push(err.rehome(field.display_name(), schema.name()));
            }
            Outcome::Fatal(err) => {
                return Err(err.rehome(field.display_name(), schema.name()));
            }
        }
    }

    Ok(warnings)
}

/// Decodes a fresh `R` from an object fragment.
///
/// This is the [`Decode`](super::Decode) implementation used by
/// [`impl_record_decode!`](crate::impl_record_decode).
pub fn decode_record<R: Record>(raw: &RawValue, cx: &mut DecodeContext) -> Outcome<R> {
    let schema = R::schema();
    let mapping = match RawMapping::split(raw, schema.name()) {
        Ok(mapping) => mapping,
        Err(err) => return Outcome::Fatal(err),
    };

    let mut record = R::default();
    match cx.descend(schema.name(), |cx| resolve_fields(&mut record, &mapping, schema, cx)) {
        Ok(warnings) => Outcome::from_parts(record, warnings),
        Err(err) => Outcome::Fatal(err),
    }
}

/// Implements [`Decode`](crate::Decode) for [`Record`](crate::Record) types.
///
/// The expected-type name reported in errors is the type as written.
#[macro_export]
macro_rules! impl_record_decode {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Decode for $ty {
            const KIND: $crate::FieldKind = $crate::FieldKind::Record;

            fn type_name() -> ::std::string::String {
                ::std::string::String::from(stringify!($ty))
            }

            fn decode_raw(
                raw: &$crate::RawValue,
                cx: &mut $crate::DecodeContext,
            ) -> $crate::Outcome<Self> {
                $crate::decode_record(raw, cx)
            }
        }
    )+};
}
