//! Schema definition file format
//!
//! Supported field types:
//! - string: UTF-8 string
//! - int: 64-bit integer
//! - bool: Boolean
//! - float: any JSON number
//! - timestamp: RFC 3339 string
//! - any: any JSON value, kept as is
//! - array: homogeneous array with element type
//! - object: inline nested record
//! - record: reference to another definition by name

use serde::{Deserialize, Serialize};

use crate::schema::Requirement;

/// Field types of a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Bool,
    Float,
    Timestamp,
    Any,
    /// Homogeneous array with single element type
    Array {
        /// Element type (boxed to allow recursive types)
        element_type: Box<FieldType>,
    },
    /// Inline nested record
    Object { fields: Vec<FieldDef> },
    /// Named record defined elsewhere
    Record { schema: String },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Float => "float",
            FieldType::Timestamp => "timestamp",
            FieldType::Any => "any",
            FieldType::Array { .. } => "array",
            FieldType::Object { .. } => "object",
            FieldType::Record { .. } => "record",
        }
    }

    /// Whether the type resolves to a nested record.
    pub fn is_record(&self) -> bool {
        matches!(self, FieldType::Object { .. } | FieldType::Record { .. })
    }

    pub fn array(element_type: FieldType) -> Self {
        FieldType::Array {
            element_type: Box::new(element_type),
        }
    }

    pub fn record(schema: impl Into<String>) -> Self {
        FieldType::Record {
            schema: schema.into(),
        }
    }
}

/// One field of a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Display name, also the output key
    pub name: String,
    /// Payload key; defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub field_type: FieldType,
    #[serde(default)]
    pub requirement: Requirement,
    /// JSON `null` accepted; zero value is `null`
    #[serde(default)]
    pub nullable: bool,
    /// Fields read from the parent's payload object
    #[serde(default)]
    pub embedded: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            key: None,
            field_type,
            requirement: Requirement::Unspecified,
            nullable: false,
            embedded: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Key looked up in the payload.
    pub fn payload_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

/// A complete definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    /// Unique record name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in resolution order
    pub fields: Vec<FieldDef>,
}

impl SchemaDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
        }
    }

    /// Names of the definitions this one refers to, inline objects included.
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        collect_references(&self.fields, &mut refs);
        refs
    }
}

fn collect_references<'a>(fields: &'a [FieldDef], refs: &mut Vec<&'a str>) {
    for field in fields {
        collect_type_references(&field.field_type, refs);
    }
}

fn collect_type_references<'a>(field_type: &'a FieldType, refs: &mut Vec<&'a str>) {
    match field_type {
        FieldType::Record { schema } => refs.push(schema),
        FieldType::Object { fields } => collect_references(fields, refs),
        FieldType::Array { element_type } => collect_type_references(element_type, refs),
        _ => {}
    }
}
