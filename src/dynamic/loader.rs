//! Definition loading and the compiled registry
//!
//! - One definition per `*.json` file; other files are skipped
//! - Definition names are unique across the directory
//! - All references are resolved when the registry is built, never during
//!   a decode call

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::DecoderConfig;
use crate::decode::{DecodeError, Outcome};
use crate::schema::{SchemaError, SchemaResult};

use super::record::{Compiler, DynamicRecord, DynamicSchema};
use super::types::SchemaDef;

/// Collects definitions from disk or from code.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    schema_dir: Option<PathBuf>,
    defs: BTreeMap<String, SchemaDef>,
}

impl SchemaLoader {
    /// Creates a loader reading definition files from `schema_dir`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: Some(schema_dir.to_path_buf()),
            defs: BTreeMap::new(),
        }
    }

    /// Creates a loader that only accepts [`register`](Self::register)ed definitions.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn schema_dir(&self) -> Option<&Path> {
        self.schema_dir.as_deref()
    }

    /// Loads every definition file in the schema directory, in file name order.
    ///
    /// A missing directory or an unreadable or invalid file is an error.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        let Some(dir) = self.schema_dir.clone() else {
            return Ok(());
        };

        let entries = fs::read_dir(&dir).map_err(|e| {
            SchemaError::malformed(
                dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
        }

        info!(dir = %dir.display(), schemas = self.defs.len(), "schema definitions loaded");
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let def: SchemaDef = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        debug!(path = %path.display(), schema = %def.name, "loaded schema definition");
        self.register(def)
    }

    /// Registers a definition directly.
    pub fn register(&mut self, def: SchemaDef) -> SchemaResult<()> {
        if def.name.is_empty() {
            return Err(SchemaError::malformed("<in-memory>", "empty schema name"));
        }
        if self.defs.contains_key(&def.name) {
            return Err(SchemaError::AlreadyRegistered(def.name));
        }
        self.defs.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDef> {
        self.defs.get(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Compiles every definition into an immutable registry.
    ///
    /// # Errors
    ///
    /// - a `record` reference to an unregistered name
    /// - a reference cycle, direct or through arrays and inline objects
    /// - an invalid field declaration
    pub fn finish(self) -> SchemaResult<SchemaRegistry> {
        let schemas = Compiler::new(&self.defs).compile_all()?;
        Ok(SchemaRegistry {
            defs: self.defs,
            schemas,
        })
    }
}

/// Compiled definitions, shared read-only across decode calls.
#[derive(Debug)]
pub struct SchemaRegistry {
    defs: BTreeMap<String, SchemaDef>,
    schemas: BTreeMap<String, Arc<DynamicSchema>>,
}

impl SchemaRegistry {
    /// Loads and compiles every definition in `dir`.
    pub fn load(dir: &Path) -> SchemaResult<Self> {
        let mut loader = SchemaLoader::new(dir);
        loader.load_all()?;
        loader.finish()
    }

    pub fn get(&self, name: &str) -> Option<&DynamicSchema> {
        self.schemas.get(name).map(|s| s.as_ref())
    }

    /// Source definition of a compiled schema.
    pub fn definition(&self, name: &str) -> Option<&SchemaDef> {
        self.defs.get(name)
    }

    /// Schema names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Decodes `payload` against the schema registered as `name`.
    pub fn decode(
        &self,
        name: &str,
        payload: &[u8],
        config: &DecoderConfig,
    ) -> Outcome<DynamicRecord> {
        match self.get(name) {
            Some(schema) => schema.decode(payload, config),
            None => Outcome::Fatal(DecodeError::invalid_target(name, "no such schema registered")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeErrorCode;
    use crate::dynamic::{FieldDef, FieldType};
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, value: serde_json::Value) {
        fs::write(dir.join(file), serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    fn sample_def() -> SchemaDef {
        SchemaDef::new(
            "users",
            vec![FieldDef::new("Name", FieldType::String).with_key("name").required()],
        )
    }

    #[test]
    fn test_register_and_get() {
        let mut loader = SchemaLoader::in_memory();
        loader.register(sample_def()).unwrap();
        assert_eq!(loader.get("users").unwrap().fields.len(), 1);

        let registry = loader.finish().unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["users"]);
        assert_eq!(registry.get("users").unwrap().name(), "users");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut loader = SchemaLoader::in_memory();
        loader.register(sample_def()).unwrap();
        assert!(matches!(
            loader.register(sample_def()),
            Err(SchemaError::AlreadyRegistered(name)) if name == "users"
        ));
    }

    #[test]
    fn test_load_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "users.json",
            json!({"name": "users", "fields": [
                {"name": "Name", "key": "name", "type": "string", "requirement": "required"}
            ]}),
        );
        fs::write(temp_dir.path().join("README.txt"), "not a schema").unwrap();

        let registry = SchemaRegistry::load(temp_dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.definition("users").is_some());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        assert!(matches!(loader.load_all(), Err(SchemaError::Malformed { .. })));
    }

    #[test]
    fn test_missing_directory_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(&temp_dir.path().join("absent"));
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_unknown_schema_is_invalid_target() {
        let registry = SchemaLoader::in_memory().finish().unwrap();
        let outcome = registry.decode("nope", b"{}", &DecoderConfig::default());
        assert_eq!(outcome.error().unwrap().code(), DecodeErrorCode::InvalidTarget);
    }
}
