//! Decode error types
//!
//! Error codes:
//! - DECODE_INVALID_TARGET (raised before decoding begins)
//! - DECODE_MALFORMED (payload is not JSON)
//! - DECODE_SHAPE_MISMATCH (object expected, something else found)
//! - DECODE_MISSING_REQUIRED_FIELD
//! - DECODE_TYPE_MISMATCH (demotable on optional fields)
//! - DECODE_DEPTH_LIMIT_EXCEEDED

use std::fmt;

/// Decode error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorCode {
    /// Target cannot receive a decoded value
    InvalidTarget,
    /// Payload is not valid JSON
    Malformed,
    /// Payload shape disagrees with the target shape
    ShapeMismatch,
    /// Required key absent from the payload
    MissingRequiredField,
    /// Fragment could not be decoded into the declared type
    TypeMismatch,
    /// Record nesting exceeded the configured limit
    DepthLimitExceeded,
}

impl DecodeErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            DecodeErrorCode::InvalidTarget => "DECODE_INVALID_TARGET",
            DecodeErrorCode::Malformed => "DECODE_MALFORMED",
            DecodeErrorCode::ShapeMismatch => "DECODE_SHAPE_MISMATCH",
            DecodeErrorCode::MissingRequiredField => "DECODE_MISSING_REQUIRED_FIELD",
            DecodeErrorCode::TypeMismatch => "DECODE_TYPE_MISMATCH",
            DecodeErrorCode::DepthLimitExceeded => "DECODE_DEPTH_LIMIT_EXCEEDED",
        }
    }
}

impl fmt::Display for DecodeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Record field, by display name
    Field(String),
    /// Sequence element
    Index(usize),
}

/// Dotted field path, outermost segment first (e.g. `Fourth.Aliases[1]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path consisting of a single field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Prepends an enclosing field name.
    pub fn prepend_field(&mut self, name: impl Into<String>) {
        self.segments.insert(0, PathSegment::Field(name.into()));
    }

    /// Prepends an enclosing sequence index.
    pub fn prepend_index(&mut self, index: usize) {
        self.segments.insert(0, PathSegment::Index(index));
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Decode failure with full context.
///
/// The path is relative to `record`: every frame that re-homes the error
/// prepends its own field name and takes ownership of the record name.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    code: DecodeErrorCode,
    /// Raw JSON text of the failing fragment, if any
    value: Option<String>,
    /// Expected target type
    expected: String,
    /// Owning record name (empty for leaf decodes)
    record: String,
    path: FieldPath,
    /// Primitive decoder message, if any
    detail: Option<String>,
}

impl DecodeError {
    fn new(code: DecodeErrorCode, expected: impl Into<String>) -> Self {
        Self {
            code,
            value: None,
            expected: expected.into(),
            record: String::new(),
            path: FieldPath::new(),
            detail: None,
        }
    }

    /// Create an invalid target error
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut err = Self::new(DecodeErrorCode::InvalidTarget, target);
        err.detail = Some(reason.into());
        err
    }

    /// Create a malformed payload error
    pub fn malformed(expected: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut err = Self::new(DecodeErrorCode::Malformed, expected);
        err.detail = Some(detail.into());
        err
    }

    /// Create a shape mismatch error for a record that received a non-object payload
    pub fn shape_mismatch(record: impl Into<String>, raw: &str, found: &str) -> Self {
        let record = record.into();
        let mut err = Self::new(DecodeErrorCode::ShapeMismatch, record.clone());
        err.record = record;
        err.value = Some(raw.to_string());
        err.detail = Some(format!("expected object, found {}", found));
        err
    }

    /// Create a missing required field error
    pub fn missing_required(
        record: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        let mut err = Self::new(DecodeErrorCode::MissingRequiredField, expected);
        err.record = record.into();
        err.path = FieldPath::field(field);
        err
    }

    /// Create a type mismatch error for a leaf value
    pub fn type_mismatch(raw: &str, expected: impl Into<String>) -> Self {
        let mut err = Self::new(DecodeErrorCode::TypeMismatch, expected);
        err.value = Some(raw.to_string());
        err
    }

    /// Create a depth limit error
    pub fn depth_exceeded(record: impl Into<String>, limit: usize) -> Self {
        let record = record.into();
        let mut err = Self::new(DecodeErrorCode::DepthLimitExceeded, record.clone());
        err.record = record;
        err.detail = Some(format!("nesting exceeds {} levels", limit));
        err
    }

    /// Attaches the primitive decoder's message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Prepends an enclosing field and moves ownership to the enclosing record.
    pub fn rehome(mut self, field: &str, record: &str) -> Self {
        self.path.prepend_field(field);
        self.record = record.to_string();
        self
    }

    /// Prepends a sequence index; owning record is left for the enclosing field to set.
    pub fn rehome_index(mut self, index: usize) -> Self {
        self.path.prepend_index(index);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> DecodeErrorCode {
        self.code
    }

    /// Returns the raw fragment, if any
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the expected type name
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Returns the owning record name
    pub fn record(&self) -> &str {
        &self.record
    }

    /// Returns the field path relative to the owning record
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns the primitive decoder's message, if any
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// `record.path`, or whichever part is known.
    pub fn qualified_field(&self) -> String {
        match (self.record.is_empty(), self.path.is_empty()) {
            (false, false) => format!("{}.{}", self.record, self.path),
            (false, true) => self.record.clone(),
            (true, _) => self.path.to_string(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.qualified_field();
        match self.code {
            DecodeErrorCode::InvalidTarget => {
                write!(f, "{}: cannot decode into {}", self.code, self.expected)?
            }
            DecodeErrorCode::Malformed => {
                write!(f, "{}: payload is not valid JSON for {}", self.code, self.expected)?
            }
            DecodeErrorCode::MissingRequiredField => write!(
                f,
                "{}: missing required field {} of type {}",
                self.code, field, self.expected
            )?,
            DecodeErrorCode::DepthLimitExceeded => {
                write!(f, "{}: cannot decode record {}", self.code, field)?
            }
            DecodeErrorCode::ShapeMismatch | DecodeErrorCode::TypeMismatch => {
                write!(f, "{}: cannot decode {}", self.code, self.value.as_deref().unwrap_or("value"))?;
                if !field.is_empty() {
                    write!(f, " into field {}", field)?;
                }
                write!(f, " of type {}", self.expected)?;
            }
        }
        if let Some(ref detail) = self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeError {}

/// Result type for fatal-only decode steps
pub type DecodeResult<T> = Result<T, DecodeError>;
