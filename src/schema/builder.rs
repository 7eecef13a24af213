//! Schema builder
//!
//! Field declarations are collected in order and checked once by
//! [`SchemaBuilder::build`].

use std::collections::HashSet;

use serde_json::value::RawValue;

use crate::decode::resolver::resolve_fields;
use crate::decode::{Decode, DecodeContext, RawMapping};

use super::errors::{SchemaError, SchemaResult};
use super::types::{
    Binding, EmbeddedBinder, FieldDescriptor, FieldKind, Record, Requirement, Schema, ValueBinder,
};

/// Collects field declarations for a [`Schema`].
pub struct SchemaBuilder<R> {
    name: String,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R: 'static> SchemaBuilder<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declares a keyed field committed through `access`.
    ///
    /// Kind and pointer-likeness follow from `T`: records decode as nested
    /// records, `Option`/`Box` wrappers are pointer-like.
    pub fn field<T, F>(
        self,
        key: impl Into<String>,
        display_name: impl Into<String>,
        requirement: Requirement,
        access: F,
    ) -> Self
    where
        T: Decode + 'static,
        F: Fn(&mut R) -> &mut T + Send + Sync + 'static,
    {
        let bind: ValueBinder<R> =
            Box::new(move |record: &mut R, raw: &RawValue, cx: &mut DecodeContext| {
                T::decode_raw(raw, cx).map(|value| *access(record) = value)
            });
        self.bind_value(
            key,
            display_name,
            requirement,
            T::KIND,
            T::POINTER_LIKE,
            T::type_name(),
            bind,
        )
    }

    /// Declares an embedded record held by value.
    pub fn embedded<E, F>(self, display_name: impl Into<String>, access: F) -> Self
    where
        E: Record + Decode,
        F: Fn(&mut R) -> &mut E + Send + Sync + 'static,
    {
        let bind: EmbeddedBinder<R> = Box::new(
            move |record: &mut R, raw: &RawMapping<'_>, cx: &mut DecodeContext| {
                let schema = E::schema();
                let target = access(record);
                cx.descend(schema.name(), |cx| resolve_fields(target, raw, schema, cx))
            },
        );
        self.bind_embedded(display_name, false, E::type_name(), bind)
    }

    /// Declares an embedded record behind an optional box.
    ///
    /// The box is allocated before its fields are resolved, so the field
    /// is never left empty after a decode.
    pub fn embedded_ptr<E, F>(self, display_name: impl Into<String>, access: F) -> Self
    where
        E: Record + Decode,
        F: Fn(&mut R) -> &mut Option<Box<E>> + Send + Sync + 'static,
    {
        let bind: EmbeddedBinder<R> = Box::new(
            move |record: &mut R, raw: &RawMapping<'_>, cx: &mut DecodeContext| {
                let schema = E::schema();
                let target = access(record).get_or_insert_with(Box::default);
                cx.descend(schema.name(), |cx| {
                    resolve_fields(&mut **target, raw, schema, cx)
                })
            },
        );
        self.bind_embedded(display_name, true, E::type_name(), bind)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn bind_value(
        mut self,
        key: impl Into<String>,
        display_name: impl Into<String>,
        requirement: Requirement,
        kind: FieldKind,
        pointer_like: bool,
        type_name: String,
        bind: ValueBinder<R>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            display_name: display_name.into(),
            requirement,
            kind,
            pointer_like,
            type_name,
            binding: Binding::Value {
                key: key.into(),
                bind,
            },
        });
        self
    }

    pub(crate) fn bind_embedded(
        mut self,
        display_name: impl Into<String>,
        pointer_like: bool,
        type_name: String,
        bind: EmbeddedBinder<R>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            display_name: display_name.into(),
            requirement: Requirement::Unspecified,
            kind: FieldKind::Embedded,
            pointer_like,
            type_name,
            binding: Binding::Embedded(bind),
        });
        self
    }

    /// Checks the declarations and freezes the schema.
    ///
    /// # Errors
    ///
    /// - empty payload key or display name
    /// - a payload key or display name declared twice
    pub fn build(self) -> SchemaResult<Schema<R>> {
        let mut keys = HashSet::new();
        let mut names = HashSet::new();

        for field in &self.fields {
            if field.display_name.is_empty() {
                return Err(SchemaError::invalid_field(&self.name, "", "empty display name"));
            }
            if !names.insert(field.display_name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    record: self.name.clone(),
                    field: field.display_name.clone(),
                });
            }
            if let Some(key) = field.payload_key() {
                if key.is_empty() {
                    return Err(SchemaError::invalid_field(
                        &self.name,
                        &field.display_name,
                        "empty payload key",
                    ));
                }
                if !keys.insert(key) {
                    return Err(SchemaError::DuplicateKey {
                        record: self.name.clone(),
                        key: key.to_string(),
                    });
                }
            }
        }

        Ok(Schema {
            name: self.name,
            fields: self.fields,
        })
    }
}
