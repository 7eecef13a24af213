//! Schema type definitions
//!
//! A [`Schema`] is the ordered list of [`FieldDescriptor`]s for one record
//! type. Descriptors carry the static facts about a field (payload key,
//! display name, requirement, kind) plus the binding that commits a decoded
//! value into the record.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::decode::{DecodeContext, DecodeResult, Outcome, ParseWarning, RawMapping};

use super::builder::SchemaBuilder;
use super::errors::{SchemaError, SchemaResult};

/// Presence and strictness classification of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    /// Must be present and must decode
    Required,
    /// May be absent; decode failures become warnings
    Optional,
    /// May be absent; decode failures are fatal
    #[default]
    Unspecified,
}

impl Requirement {
    /// Parses a declarative tag. An empty tag means `Unspecified`.
    pub fn from_tag(tag: &str) -> SchemaResult<Self> {
        match tag.trim() {
            "" => Ok(Requirement::Unspecified),
            "required" => Ok(Requirement::Required),
            "optional" => Ok(Requirement::Optional),
            other => Err(SchemaError::UnknownRequirement(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::Required => "required",
            Requirement::Optional => "optional",
            Requirement::Unspecified => "unspecified",
        }
    }

    /// Only `Required` fields fail when absent.
    pub fn enforces_presence(&self) -> bool {
        *self == Requirement::Required
    }

    /// Only `Optional` fields demote decode failures to warnings.
    pub fn tolerates_failure(&self) -> bool {
        *self == Requirement::Optional
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a field is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Leaf value handed to the primitive decoder
    Scalar,
    /// Nested record under its own key
    Record,
    /// Record whose fields are read from the parent's mapping
    Embedded,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Record => "record",
            FieldKind::Embedded => "embedded",
        }
    }
}

/// Decodes a keyed fragment and commits it into the record.
pub(crate) type ValueBinder<R> =
    Box<dyn Fn(&mut R, &RawValue, &mut DecodeContext) -> Outcome<()> + Send + Sync>;

/// Resolves an embedded record against the parent's mapping.
pub(crate) type EmbeddedBinder<R> = Box<
    dyn Fn(&mut R, &RawMapping<'_>, &mut DecodeContext) -> DecodeResult<ParseWarning>
        + Send
        + Sync,
>;

pub(crate) enum Binding<R> {
    Value { key: String, bind: ValueBinder<R> },
    Embedded(EmbeddedBinder<R>),
}

/// One field of a record schema.
pub struct FieldDescriptor<R> {
    pub(crate) display_name: String,
    pub(crate) requirement: Requirement,
    pub(crate) kind: FieldKind,
    pub(crate) pointer_like: bool,
    pub(crate) type_name: String,
    pub(crate) binding: Binding<R>,
}

impl<R> FieldDescriptor<R> {
    /// Key looked up in the raw mapping; `None` for embedded fields.
    pub fn payload_key(&self) -> Option<&str> {
        match &self.binding {
            Binding::Value { key, .. } => Some(key),
            Binding::Embedded(_) => None,
        }
    }

    /// Name used in error paths.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether absence leaves an empty reference rather than a zero value.
    pub fn is_pointer_like(&self) -> bool {
        self.pointer_like
    }

    /// Declared target type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("payload_key", &self.payload_key())
            .field("display_name", &self.display_name)
            .field("requirement", &self.requirement)
            .field("kind", &self.kind)
            .field("pointer_like", &self.pointer_like)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Immutable decode description of one record type.
pub struct Schema<R> {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldDescriptor<R>>,
}

impl<R: 'static> Schema<R> {
    /// Starts a schema for a record named `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder<R> {
        SchemaBuilder::new(name)
    }
}

impl<R> Schema<R> {
    /// Record name used as the owner of error paths.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    /// Looks up a field by display name.
    pub fn field(&self, display_name: &str) -> Option<&FieldDescriptor<R>> {
        self.fields.iter().find(|f| f.display_name == display_name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// A record type with a registered schema.
///
/// Implementations build their schema once and hand out the same
/// `&'static` reference on every call:
///
/// ```
/// use std::sync::OnceLock;
/// use lenient_json::{impl_record_decode, Record, Requirement, Schema};
///
/// #[derive(Debug, Default)]
/// struct User {
///     name: String,
///     age: Option<i64>,
/// }
///
/// impl Record for User {
///     fn schema() -> &'static Schema<Self> {
///         static SCHEMA: OnceLock<Schema<User>> = OnceLock::new();
///         SCHEMA.get_or_init(|| {
///             Schema::builder("User")
///                 .field("name", "Name", Requirement::Required, |u: &mut User| &mut u.name)
///                 .field("age", "Age", Requirement::Optional, |u: &mut User| &mut u.age)
///                 .build()
///                 .expect("valid schema")
///         })
///     }
/// }
///
/// impl_record_decode!(User);
///
/// let user: User = lenient_json::decode(br#"{"name": "Ann", "age": "n/a"}"#)
///     .into_value()
///     .unwrap();
/// assert_eq!(user.name, "Ann");
/// assert_eq!(user.age, None);
/// ```
pub trait Record: Default + 'static {
    fn schema() -> &'static Schema<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_from_tag() {
        assert_eq!(Requirement::from_tag("required").unwrap(), Requirement::Required);
        assert_eq!(Requirement::from_tag("optional").unwrap(), Requirement::Optional);
        assert_eq!(Requirement::from_tag("").unwrap(), Requirement::Unspecified);
        assert!(matches!(
            Requirement::from_tag("sometimes"),
            Err(SchemaError::UnknownRequirement(tag)) if tag == "sometimes"
        ));
    }

    #[test]
    fn test_requirement_policies() {
        assert!(Requirement::Required.enforces_presence());
        assert!(!Requirement::Optional.enforces_presence());
        assert!(!Requirement::Unspecified.enforces_presence());

        assert!(Requirement::Optional.tolerates_failure());
        assert!(!Requirement::Required.tolerates_failure());
        assert!(!Requirement::Unspecified.tolerates_failure());
    }

    #[test]
    fn test_requirement_serde() {
        let req: Requirement = serde_json::from_str("\"optional\"").unwrap();
        assert_eq!(req, Requirement::Optional);
        assert_eq!(serde_json::to_string(&Requirement::Required).unwrap(), "\"required\"");
    }
}
