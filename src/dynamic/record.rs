//! Compiled definitions and their decoder.
//!
//! Definitions compile into ordinary [`Schema`]s over [`DynamicRecord`], so
//! runtime-loaded schemas go through the same field resolver as typed ones.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::config::DecoderConfig;
use crate::decode::resolver::resolve_fields;
use crate::decode::{
    decode_sequence, decode_serde, log_outcome, parse_payload, DecodeContext, DecodeError,
    DecodeResult, Outcome, ParseWarning, PayloadShape, RawMapping,
};
use crate::schema::{EmbeddedBinder, FieldKind, Schema, SchemaError, SchemaResult, ValueBinder};

use super::types::{FieldDef, FieldType, SchemaDef};

/// Decoded value of a runtime-loaded schema, keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DynamicRecord {
    fields: Map<String, Value>,
}

impl DynamicRecord {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Takes the nested record stored under `name`, or `zero` if none is.
    fn take_nested(&mut self, name: &str, zero: &DynamicRecord) -> DynamicRecord {
        match self.fields.get_mut(name).map(Value::take) {
            Some(Value::Object(fields)) => DynamicRecord { fields },
            _ => zero.clone(),
        }
    }
}

/// A compiled definition.
pub struct DynamicSchema {
    schema: Schema<DynamicRecord>,
    zero: DynamicRecord,
}

impl DynamicSchema {
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Schema<DynamicRecord> {
        &self.schema
    }

    /// Record with every field at its zero value.
    pub fn zero_record(&self) -> DynamicRecord {
        self.zero.clone()
    }

    /// Decodes a top-level payload against this schema.
    pub fn decode(&self, payload: &[u8], config: &DecoderConfig) -> Outcome<DynamicRecord> {
        let outcome = match parse_payload(payload, self.name()) {
            Ok(raw) => decode_dynamic_record(self, raw, &mut DecodeContext::new(config)),
            Err(err) => Outcome::Fatal(err),
        };
        log_outcome(self.name(), &outcome);
        outcome
    }
}

impl std::fmt::Debug for DynamicSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicSchema")
            .field("schema", &self.schema)
            .finish()
    }
}

fn decode_dynamic_record(
    schema: &DynamicSchema,
    raw: &RawValue,
    cx: &mut DecodeContext,
) -> Outcome<DynamicRecord> {
    let mapping = match RawMapping::split(raw, schema.name()) {
        Ok(mapping) => mapping,
        Err(err) => return Outcome::Fatal(err),
    };

    let mut record = schema.zero_record();
    match cx.descend(schema.name(), |cx| {
        resolve_fields(&mut record, &mapping, &schema.schema, cx)
    }) {
        Ok(warnings) => Outcome::from_parts(record, warnings),
        Err(err) => Outcome::Fatal(err),
    }
}

/// Field type with record references resolved.
#[derive(Clone)]
enum CompiledType {
    String,
    Int,
    Bool,
    Float,
    Timestamp,
    Any,
    Array(Box<CompiledType>),
    Record(Arc<DynamicSchema>),
}

impl CompiledType {
    fn type_name(&self) -> String {
        match self {
            CompiledType::String => "string".into(),
            CompiledType::Int => "int".into(),
            CompiledType::Bool => "bool".into(),
            CompiledType::Float => "float".into(),
            CompiledType::Timestamp => "timestamp".into(),
            CompiledType::Any => "any".into(),
            CompiledType::Array(element) => format!("array<{}>", element.type_name()),
            CompiledType::Record(schema) => schema.name().to_string(),
        }
    }

    fn zero_value(&self, nullable: bool) -> Value {
        if nullable {
            return Value::Null;
        }
        match self {
            CompiledType::String => Value::String(String::new()),
            CompiledType::Int => Value::from(0),
            CompiledType::Float => Value::from(0.0),
            CompiledType::Bool => Value::Bool(false),
            CompiledType::Timestamp | CompiledType::Any => Value::Null,
            CompiledType::Array(_) => Value::Array(Vec::new()),
            CompiledType::Record(schema) => schema.zero_record().into_value(),
        }
    }
}

fn decode_value(
    ty: &CompiledType,
    nullable: bool,
    raw: &RawValue,
    cx: &mut DecodeContext,
) -> Outcome<Value> {
    if nullable && PayloadShape::of(raw) == PayloadShape::Null {
        return Outcome::Clean(Value::Null);
    }

    match ty {
        CompiledType::Timestamp => decode_serde::<DateTime<FixedOffset>>(raw, "timestamp")
            .map(|ts| Value::String(ts.to_rfc3339())),
        CompiledType::Any => decode_serde::<Value>(raw, "any"),
        CompiledType::Array(element) => {
            decode_sequence(raw, &ty.type_name(), cx, |item, cx| {
                decode_value(element, false, item, cx)
            })
            .map(Value::Array)
        }
        CompiledType::Record(schema) => {
            decode_dynamic_record(schema, raw, cx).map(DynamicRecord::into_value)
        }
        leaf => match decode_serde::<Value>(raw, &leaf.type_name()) {
            Outcome::Clean(value) if leaf_matches(leaf, &value) => Outcome::Clean(value),
            Outcome::Fatal(err) => Outcome::Fatal(err),
            Outcome::Clean(value) | Outcome::Warned(value, _) => Outcome::Fatal(
                DecodeError::type_mismatch(raw.get(), leaf.type_name())
                    .with_detail(format!("found {}", json_type_name(&value))),
            ),
        },
    }
}

fn leaf_matches(ty: &CompiledType, value: &Value) -> bool {
    match ty {
        CompiledType::String => value.is_string(),
        // Must be an integer (not a float)
        CompiledType::Int => value.is_i64() || value.is_u64(),
        CompiledType::Bool => value.is_boolean(),
        // Accept both integers and floats as float
        CompiledType::Float => value.is_number(),
        _ => true,
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compiles definitions on demand, following record references.
pub(crate) struct Compiler<'a> {
    defs: &'a BTreeMap<String, SchemaDef>,
    done: HashMap<String, Arc<DynamicSchema>>,
    visiting: Vec<String>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(defs: &'a BTreeMap<String, SchemaDef>) -> Self {
        Self {
            defs,
            done: HashMap::new(),
            visiting: Vec::new(),
        }
    }

    /// Compiles every definition.
    pub(crate) fn compile_all(mut self) -> SchemaResult<BTreeMap<String, Arc<DynamicSchema>>> {
        let defs = self.defs;
        for name in defs.keys() {
            self.compile_named(name)?;
        }
        Ok(self.done.into_iter().collect())
    }

    fn compile_named(&mut self, name: &str) -> SchemaResult<Arc<DynamicSchema>> {
        if let Some(schema) = self.done.get(name) {
            return Ok(Arc::clone(schema));
        }

        if let Some(start) = self.visiting.iter().position(|n| n == name) {
            let mut chain = self.visiting[start..].to_vec();
            chain.push(name.to_string());
            return Err(SchemaError::Cycle(chain.join(" -> ")));
        }

        let defs = self.defs;
        let def = defs
            .get(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))?;

        self.visiting.push(name.to_string());
        let compiled = self.compile_fields(&def.name, &def.fields);
        self.visiting.pop();

        let compiled = compiled?;
        self.done.insert(name.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    fn compile_fields(
        &mut self,
        record: &str,
        fields: &[FieldDef],
    ) -> SchemaResult<Arc<DynamicSchema>> {
        let mut builder = Schema::<DynamicRecord>::builder(record);
        let mut zero = DynamicRecord::default();

        for field in fields {
            let ty = self.compile_type(field, &field.field_type)?;
            zero.set(&field.name, ty.zero_value(field.nullable));

            builder = if field.embedded {
                let CompiledType::Record(nested) = ty else {
                    return Err(SchemaError::invalid_field(
                        record,
                        &field.name,
                        "only object and record fields can be embedded",
                    ));
                };
                if field.key.is_some() {
                    return Err(SchemaError::invalid_field(
                        record,
                        &field.name,
                        "embedded fields have no payload key",
                    ));
                }
                let type_name = nested.name().to_string();
                builder.bind_embedded(
                    &field.name,
                    field.nullable,
                    type_name,
                    embedded_binder(field.name.clone(), nested),
                )
            } else {
                let kind = match ty {
                    CompiledType::Record(_) => FieldKind::Record,
                    _ => FieldKind::Scalar,
                };
                let type_name = ty.type_name();
                builder.bind_value(
                    field.payload_key(),
                    &field.name,
                    field.requirement,
                    kind,
                    field.nullable,
                    type_name,
                    value_binder(field.name.clone(), ty, field.nullable),
                )
            };
        }

        Ok(Arc::new(DynamicSchema {
            schema: builder.build()?,
            zero,
        }))
    }

    fn compile_type(
        &mut self,
        field: &FieldDef,
        field_type: &FieldType,
    ) -> SchemaResult<CompiledType> {
        Ok(match field_type {
            FieldType::String => CompiledType::String,
            FieldType::Int => CompiledType::Int,
            FieldType::Bool => CompiledType::Bool,
            FieldType::Float => CompiledType::Float,
            FieldType::Timestamp => CompiledType::Timestamp,
            FieldType::Any => CompiledType::Any,
            FieldType::Array { element_type } => {
                CompiledType::Array(Box::new(self.compile_type(field, element_type)?))
            }
            FieldType::Object { fields } => {
                CompiledType::Record(self.compile_fields(&field.name, fields)?)
            }
            FieldType::Record { schema } => CompiledType::Record(self.compile_named(schema)?),
        })
    }
}

fn value_binder(name: String, ty: CompiledType, nullable: bool) -> ValueBinder<DynamicRecord> {
    Box::new(
        move |record: &mut DynamicRecord, raw: &RawValue, cx: &mut DecodeContext| {
            decode_value(&ty, nullable, raw, cx).map(|value| record.set(&name, value))
        },
    )
}

/// Embedded records are materialized from their zero value, resolved
/// against the parent's mapping, then stored back under their name.
fn embedded_binder(name: String, nested: Arc<DynamicSchema>) -> EmbeddedBinder<DynamicRecord> {
    Box::new(
        move |record: &mut DynamicRecord,
              raw: &RawMapping<'_>,
              cx: &mut DecodeContext|
              -> DecodeResult<ParseWarning> {
            let mut target = record.take_nested(&name, &nested.zero);
            let warnings = cx.descend(nested.name(), |cx| {
                resolve_fields(&mut target, raw, &nested.schema, cx)
            })?;
            record.set(&name, target.into_value());
            Ok(warnings)
        },
    )
}
