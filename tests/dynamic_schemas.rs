//! Runtime-loaded schema tests
//!
//! Test Categories:
//! 1. Loading definition directories
//! 2. Registry compile errors
//! 3. Lenient decoding of dynamic records

use std::fs;
use std::path::Path;

use lenient_json::dynamic::{SchemaLoader, SchemaRegistry};
use lenient_json::{DecodeErrorCode, DecoderConfig, SchemaError};
use serde_json::{json, Value};
use tempfile::TempDir;

fn write_def(dir: &Path, file: &str, def: Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(&def).unwrap()).unwrap();
}

fn person_def() -> Value {
    json!({
        "name": "person",
        "fields": [
            {"name": "FirstName", "key": "fname", "type": "string", "requirement": "required"},
            {"name": "MiddleName", "key": "mname", "type": "string", "requirement": "optional"},
            {"name": "LastName", "key": "lname", "type": "string"},
            {"name": "Aliases", "key": "aka", "type": "array",
             "element_type": {"type": "string"}, "requirement": "optional"}
        ]
    })
}

fn document_def() -> Value {
    json!({
        "name": "document",
        "description": "nested records with optional fields at two levels",
        "fields": [
            {"name": "First", "key": "first", "type": "string", "requirement": "required"},
            {"name": "Second", "key": "second", "type": "int"},
            {"name": "Third", "key": "third", "type": "timestamp"},
            {"name": "Fourth", "key": "fourth", "type": "record", "schema": "person"},
            {"name": "Fifth", "key": "fifth", "type": "record", "schema": "person",
             "nullable": true},
            {"name": "Sixth", "key": "sixth", "type": "float", "nullable": true},
            {"name": "Seventh", "key": "seventh", "type": "int", "nullable": true,
             "requirement": "optional"},
            {"name": "Eighth", "key": "eighth", "type": "int", "nullable": true}
        ]
    })
}

fn registry_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_def(temp_dir.path(), "person.json", person_def());
    write_def(temp_dir.path(), "document.json", document_def());
    temp_dir
}

// =============================================================================
// LOADING
// =============================================================================

#[test]
fn test_load_directory() {
    let temp_dir = registry_dir();
    fs::write(temp_dir.path().join("notes.md"), "# not a schema").unwrap();

    let registry = SchemaRegistry::load(temp_dir.path()).unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["document", "person"]);

    let person = registry.get("person").unwrap();
    assert_eq!(person.schema().len(), 4);
    assert_eq!(person.schema().fields()[3].type_name(), "array<string>");
}

#[test]
fn test_duplicate_name_across_files() {
    let temp_dir = registry_dir();
    write_def(temp_dir.path(), "person_copy.json", person_def());

    let mut loader = SchemaLoader::new(temp_dir.path());
    assert!(matches!(
        loader.load_all(),
        Err(SchemaError::AlreadyRegistered(name)) if name == "person"
    ));
}

// =============================================================================
// COMPILE ERRORS
// =============================================================================

#[test]
fn test_unknown_reference() {
    let temp_dir = TempDir::new().unwrap();
    write_def(temp_dir.path(), "document.json", document_def());

    let result = SchemaRegistry::load(temp_dir.path());
    assert!(matches!(result, Err(SchemaError::UnknownSchema(name)) if name == "person"));
}

#[test]
fn test_self_reference_is_cycle() {
    let temp_dir = TempDir::new().unwrap();
    write_def(
        temp_dir.path(),
        "node.json",
        json!({"name": "node", "fields": [
            {"name": "Next", "key": "next", "type": "record", "schema": "node", "nullable": true}
        ]}),
    );

    match SchemaRegistry::load(temp_dir.path()) {
        Err(SchemaError::Cycle(chain)) => assert_eq!(chain, "node -> node"),
        other => panic!("expected cycle, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_embedded_with_key_rejected() {
    let temp_dir = registry_dir();
    write_def(
        temp_dir.path(),
        "bad.json",
        json!({"name": "bad", "fields": [
            {"name": "Who", "key": "who", "type": "record", "schema": "person", "embedded": true}
        ]}),
    );

    assert!(matches!(
        SchemaRegistry::load(temp_dir.path()),
        Err(SchemaError::InvalidField { field, .. }) if field == "Who"
    ));
}

// =============================================================================
// DECODING
// =============================================================================

#[test]
fn test_three_problems_across_two_levels() {
    let temp_dir = registry_dir();
    let registry = SchemaRegistry::load(temp_dir.path()).unwrap();

    let payload = br#"{
        "first": "foo",
        "second": 42,
        "third": "2022-01-10T16:07:37+01:00",
        "fourth": {"fname": "foo", "lname": "bar", "aka": "['joe']"},
        "fifth": {"fname": "foo", "mname": 42, "lname": "bar", "aka": ["joe"]},
        "sixth": 43.33,
        "seventh": "43",
        "eighth": null
    }"#;
    let outcome = registry.decode("document", payload, &DecoderConfig::default());

    let paths: Vec<String> = outcome
        .warnings()
        .unwrap()
        .iter()
        .map(|w| w.path().to_string())
        .collect();
    assert_eq!(paths, vec!["Fourth.Aliases", "Fifth.MiddleName", "Seventh"]);

    let record = outcome.into_value().unwrap().into_value();
    assert_eq!(
        record,
        json!({
            "First": "foo",
            "Second": 42,
            "Third": "2022-01-10T16:07:37+01:00",
            "Fourth": {"FirstName": "foo", "MiddleName": "", "LastName": "bar", "Aliases": []},
            "Fifth": {"FirstName": "foo", "MiddleName": "", "LastName": "bar", "Aliases": ["joe"]},
            "Sixth": 43.33,
            "Seventh": null,
            "Eighth": null
        })
    );
}

#[test]
fn test_nested_required_is_fatal() {
    let temp_dir = registry_dir();
    let registry = SchemaRegistry::load(temp_dir.path()).unwrap();

    let outcome = registry.decode(
        "document",
        br#"{"first": "foo", "fourth": {}}"#,
        &DecoderConfig::default(),
    );
    let err = outcome.error().unwrap();
    assert_eq!(err.code(), DecodeErrorCode::MissingRequiredField);
    assert_eq!(err.path().to_string(), "Fourth.FirstName");
    assert_eq!(err.record(), "document");
}

#[test]
fn test_unknown_target() {
    let temp_dir = registry_dir();
    let registry = SchemaRegistry::load(temp_dir.path()).unwrap();

    let outcome = registry.decode("invoice", b"{}", &DecoderConfig::default());
    assert_eq!(outcome.error().unwrap().code(), DecodeErrorCode::InvalidTarget);
}

#[test]
fn test_depth_limit_applies() {
    let temp_dir = registry_dir();
    let registry = SchemaRegistry::load(temp_dir.path()).unwrap();

    let outcome = registry.decode(
        "document",
        br#"{"first": "foo", "fourth": {"fname": "a"}}"#,
        &DecoderConfig::with_max_depth(1),
    );
    assert_eq!(outcome.error().unwrap().code(), DecodeErrorCode::DepthLimitExceeded);
}
