//! Leaf decoding
//!
//! Scalars, timestamps, and anything else implementing `serde::Deserialize`
//! are handed to serde_json whole. `Option`, `Box` and `Vec` wrap another
//! [`Decode`] type so that records inside them keep lenient semantics.

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::schema::FieldKind;

use super::context::DecodeContext;
use super::errors::DecodeError;
use super::outcome::Outcome;
use super::raw::PayloadShape;
use super::warning::ParseWarning;

/// A type that can be decoded from a raw JSON fragment.
pub trait Decode: Sized {
    /// `Record` for schema-backed types, `Scalar` otherwise.
    const KIND: FieldKind = FieldKind::Scalar;

    /// Whether a JSON `null` maps to an empty reference.
    const POINTER_LIKE: bool = false;

    /// Name reported as the expected type in errors.
    fn type_name() -> String;

    fn decode_raw(raw: &RawValue, cx: &mut DecodeContext) -> Outcome<Self>;
}

/// Decodes a fragment with serde_json, reporting failures as type mismatches.
pub fn decode_serde<T: DeserializeOwned>(raw: &RawValue, type_name: &str) -> Outcome<T> {
    match serde_json::from_str::<T>(raw.get()) {
        Ok(value) => Outcome::Clean(value),
        Err(e) => Outcome::Fatal(
            DecodeError::type_mismatch(raw.get(), type_name).with_detail(e.to_string()),
        ),
    }
}

/// Decodes a JSON array element by element.
///
/// An element failure aborts the sequence with the element index prepended
/// to its path; element warnings are kept, re-homed the same way.
pub fn decode_sequence<V, F>(
    raw: &RawValue,
    type_name: &str,
    cx: &mut DecodeContext,
    mut decode_item: F,
) -> Outcome<Vec<V>>
where
    F: FnMut(&RawValue, &mut DecodeContext) -> Outcome<V>,
{
    let shape = PayloadShape::of(raw);
    if shape != PayloadShape::Array {
        return Outcome::Fatal(
            DecodeError::type_mismatch(raw.get(), type_name)
                .with_detail(format!("expected array, found {}", shape.name())),
        );
    }

    let items: Vec<&RawValue> = match serde_json::from_str(raw.get()) {
        Ok(items) => items,
        Err(e) => return Outcome::Fatal(DecodeError::malformed(type_name, e.to_string())),
    };

    let mut values = Vec::with_capacity(items.len());
    let mut warnings = ParseWarning::new();

    for (index, item) in items.into_iter().enumerate() {
        match decode_item(item, cx) {
            Outcome::Clean(value) => values.push(value),
            Outcome::Warned(value, nested) => {
                values.push(value);
                warnings.merge_element(index, nested);
            }
            Outcome::Fatal(err) => return Outcome::Fatal(err.rehome_index(index)),
        }
    }

    Outcome::from_parts(values, warnings)
}

/// Implements [`Decode`] for types that decode through serde_json as a whole.
///
/// ```
/// use serde::Deserialize;
/// use lenient_json::impl_serde_decode;
///
/// #[derive(Debug, Deserialize)]
/// struct Rgb(u8, u8, u8);
///
/// impl_serde_decode!(Rgb => "rgb");
///
/// let color: Rgb = lenient_json::decode(b"[255, 0, 10]").into_value().unwrap();
/// assert_eq!(color.2, 10);
/// ```
#[macro_export]
macro_rules! impl_serde_decode {
    ($($ty:ty => $name:expr),+ $(,)?) => {$(
        impl $crate::Decode for $ty {
            fn type_name() -> ::std::string::String {
                ::std::string::String::from($name)
            }

            fn decode_raw(
                raw: &$crate::RawValue,
                _cx: &mut $crate::DecodeContext,
            ) -> $crate::Outcome<Self> {
                $crate::decode_serde(raw, $name)
            }
        }
    )+};
}

impl_serde_decode!(
    String => "string",
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    chrono::DateTime<chrono::Utc> => "timestamp",
    chrono::DateTime<chrono::FixedOffset> => "timestamp",
    chrono::NaiveDateTime => "datetime",
    chrono::NaiveDate => "date",
    serde_json::Value => "any",
);

impl<T: Decode> Decode for Option<T> {
    const KIND: FieldKind = T::KIND;
    const POINTER_LIKE: bool = true;

    fn type_name() -> String {
        T::type_name()
    }

    fn decode_raw(raw: &RawValue, cx: &mut DecodeContext) -> Outcome<Self> {
        if PayloadShape::of(raw) == PayloadShape::Null {
            return Outcome::Clean(None);
        }
        T::decode_raw(raw, cx).map(Some)
    }
}

impl<T: Decode> Decode for Box<T> {
    const KIND: FieldKind = T::KIND;
    const POINTER_LIKE: bool = true;

    fn type_name() -> String {
        T::type_name()
    }

    fn decode_raw(raw: &RawValue, cx: &mut DecodeContext) -> Outcome<Self> {
        T::decode_raw(raw, cx).map(Box::new)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn type_name() -> String {
        format!("array<{}>", T::type_name())
    }

    fn decode_raw(raw: &RawValue, cx: &mut DecodeContext) -> Outcome<Self> {
        decode_sequence(raw, &Self::type_name(), cx, T::decode_raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::errors::DecodeErrorCode;
    use crate::decode::raw::parse_payload;
    use chrono::{DateTime, Utc};

    fn leaf<T: Decode>(text: &str) -> Outcome<T> {
        let raw = parse_payload(text.as_bytes(), "test").unwrap();
        T::decode_raw(raw, &mut DecodeContext::default())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(leaf::<String>("\"foo bar\"").into_value().unwrap(), "foo bar");
        assert_eq!(leaf::<i64>("42").into_value().unwrap(), 42);
        assert_eq!(leaf::<f32>("43.33").into_value().unwrap(), 43.33);
        assert!(leaf::<bool>("true").into_value().unwrap());
    }

    #[test]
    fn test_scalar_mismatch() {
        let outcome = leaf::<i64>("\"43\"");
        let err = outcome.error().unwrap();
        assert_eq!(err.code(), DecodeErrorCode::TypeMismatch);
        assert_eq!(err.value(), Some("\"43\""));
        assert_eq!(err.expected(), "i64");
        assert!(err.path().is_empty());
    }

    #[test]
    fn test_null_rejected_by_plain_types() {
        assert!(leaf::<String>("null").is_fatal());
        assert!(leaf::<i32>("null").is_fatal());
    }

    #[test]
    fn test_option_accepts_null() {
        assert_eq!(leaf::<Option<i32>>("null").into_value().unwrap(), None);
        assert_eq!(leaf::<Option<i32>>("7").into_value().unwrap(), Some(7));
        assert!(leaf::<Option<i32>>("\"7\"").is_fatal());
    }

    #[test]
    fn test_timestamp() {
        let ts = leaf::<DateTime<Utc>>("\"2022-01-10T16:07:37+01:00\"").into_value().unwrap();
        assert_eq!(ts.to_rfc3339(), "2022-01-10T15:07:37+00:00");
        assert!(leaf::<DateTime<Utc>>("\"yesterday\"").is_fatal());
    }

    #[test]
    fn test_sequence() {
        let tags = leaf::<Vec<String>>("[\"a\", \"b\"]").into_value().unwrap();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn test_sequence_rejects_non_array() {
        let outcome = leaf::<Vec<String>>("\"['joe']\"");
        let err = outcome.error().unwrap();
        assert_eq!(err.code(), DecodeErrorCode::TypeMismatch);
        assert_eq!(err.expected(), "array<string>");
    }

    #[test]
    fn test_sequence_element_failure_has_index() {
        let outcome = leaf::<Vec<i32>>("[1, 2, \"three\"]");
        let err = outcome.error().unwrap();
        assert_eq!(err.path().to_string(), "[2]");
        assert_eq!(err.value(), Some("\"three\""));
    }

    #[test]
    fn test_any_value() {
        let value = leaf::<serde_json::Value>("{\"a\": [1, null]}").into_value().unwrap();
        assert_eq!(value, serde_json::json!({"a": [1, null]}));
    }
}
