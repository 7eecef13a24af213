//! Raw payload splitting.
//!
//! A record level is resolved against a [`RawMapping`]: member name to the
//! still-encoded JSON text of its value. Nested fragments are decoded lazily
//! by the field that owns them.

use std::collections::HashMap;

use serde_json::value::RawValue;

use super::errors::{DecodeError, DecodeResult};

/// Top-level JSON shape of a raw fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl PayloadShape {
    /// Classifies a fragment by its first significant byte.
    ///
    /// Fragments handed out by serde_json are already validated, so the
    /// first byte decides the shape.
    pub fn of(raw: &RawValue) -> Self {
        match raw.get().trim_start().as_bytes().first() {
            Some(b'{') => PayloadShape::Object,
            Some(b'[') => PayloadShape::Array,
            Some(b'"') => PayloadShape::String,
            Some(b't') | Some(b'f') => PayloadShape::Bool,
            Some(b'n') => PayloadShape::Null,
            _ => PayloadShape::Number,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PayloadShape::Object => "object",
            PayloadShape::Array => "array",
            PayloadShape::String => "string",
            PayloadShape::Number => "number",
            PayloadShape::Bool => "bool",
            PayloadShape::Null => "null",
        }
    }
}

/// Parses a top-level payload into a validated raw fragment.
///
/// This is the only place where syntax errors surface; everything below
/// works on fragments serde_json has already checked.
pub fn parse_payload<'a>(payload: &'a [u8], target: &str) -> DecodeResult<&'a RawValue> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| DecodeError::malformed(target, format!("invalid UTF-8: {}", e)))?;
    serde_json::from_str::<&RawValue>(text).map_err(|e| DecodeError::malformed(target, e.to_string()))
}

/// Member name to raw fragment for one record level.
///
/// Keys are unique; when a payload repeats a key the last occurrence wins.
#[derive(Debug, Default)]
pub struct RawMapping<'a> {
    entries: HashMap<String, &'a RawValue>,
}

impl<'a> RawMapping<'a> {
    /// Splits an object fragment for `record`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the fragment is not an object.
    pub fn split(raw: &'a RawValue, record: &str) -> DecodeResult<Self> {
        let shape = PayloadShape::of(raw);
        if shape != PayloadShape::Object {
            return Err(DecodeError::shape_mismatch(record, raw.get(), shape.name()));
        }

        let entries: HashMap<String, &'a RawValue> = serde_json::from_str(raw.get())
            .map_err(|e| DecodeError::malformed(record, e.to_string()))?;

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&'a RawValue> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::errors::DecodeErrorCode;

    #[test]
    fn test_split_object() {
        let raw = parse_payload(br#"{"first": "foo", "second": {"a": [1, 2]}}"#, "data").unwrap();
        let mapping = RawMapping::split(raw, "data").unwrap();

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("first").unwrap().get(), "\"foo\"");
        assert_eq!(mapping.get("second").unwrap().get(), "{\"a\": [1, 2]}");
        assert!(mapping.get("third").is_none());
    }

    #[test]
    fn test_split_rejects_non_objects() {
        for payload in [&b"[1, 2]"[..], b"42", b"\"text\"", b"null", b"true"] {
            let raw = parse_payload(payload, "data").unwrap();
            let err = RawMapping::split(raw, "data").unwrap_err();
            assert_eq!(err.code(), DecodeErrorCode::ShapeMismatch);
            assert_eq!(err.record(), "data");
        }
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let raw = parse_payload(br#"{"a": 1, "a": 2}"#, "data").unwrap();
        let mapping = RawMapping::split(raw, "data").unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("a").unwrap().get(), "2");
    }

    #[test]
    fn test_malformed_payload() {
        let err = parse_payload(b"{\"a\": ", "data").unwrap_err();
        assert_eq!(err.code(), DecodeErrorCode::Malformed);

        let err = parse_payload(&[0xff, 0xfe], "data").unwrap_err();
        assert_eq!(err.code(), DecodeErrorCode::Malformed);
    }

    #[test]
    fn test_shape_classification() {
        let cases = [
            ("{}", PayloadShape::Object),
            ("[]", PayloadShape::Array),
            ("\"s\"", PayloadShape::String),
            ("-1.5", PayloadShape::Number),
            ("false", PayloadShape::Bool),
            ("null", PayloadShape::Null),
        ];
        for (text, shape) in cases {
            let raw = parse_payload(text.as_bytes(), "t").unwrap();
            assert_eq!(PayloadShape::of(raw), shape);
        }
    }
}
