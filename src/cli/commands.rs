//! CLI command implementations
//!
//! Every command writes exactly one JSON object to stdout. A decode that
//! fails (or warns under `--deny-warnings`) still writes its response
//! before the error is returned, so the caller gets both the report and a
//! non-zero exit status.

use std::path::Path;

use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::DecoderConfig;
use crate::decode::Outcome;
use crate::dynamic::{DynamicRecord, SchemaRegistry};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{
    error_response, read_payload, success_response, warnings_response, write_response,
};

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_tracing();
    run_command(cli.command)
}

/// Installs a stderr subscriber honouring `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Decode {
            schemas,
            schema,
            config,
            input,
            deny_warnings,
        } => decode(&schemas, &schema, config.as_deref(), input.as_deref(), deny_warnings),
        Command::Schemas { schemas } => list_schemas(&schemas),
    }
}

/// Decodes one payload against `schema` from the definitions in `schema_dir`.
pub fn decode(
    schema_dir: &Path,
    schema: &str,
    config_path: Option<&Path>,
    input: Option<&Path>,
    deny_warnings: bool,
) -> CliResult<()> {
    let config = match config_path {
        Some(path) => DecoderConfig::load(path)?,
        None => DecoderConfig::default(),
    };
    let registry = SchemaRegistry::load(schema_dir)?;
    let payload = read_payload(input)?;

    info!(schema, bytes = payload.len(), "decoding payload");
    let outcome = registry.decode(schema, &payload, &config);

    let (response, result) = render_outcome(outcome, deny_warnings);
    write_response(&response)?;
    result
}

/// Builds the response for a decode outcome, plus the error to exit with.
pub fn render_outcome(
    outcome: Outcome<DynamicRecord>,
    deny_warnings: bool,
) -> (Value, CliResult<()>) {
    match outcome {
        Outcome::Clean(record) => (success_response(record.into_value()), Ok(())),
        Outcome::Warned(record, warnings) => {
            let result = if deny_warnings {
                Err(CliError::warnings_denied(warnings.len()))
            } else {
                Ok(())
            };
            (warnings_response(record.into_value(), &warnings), result)
        }
        Outcome::Fatal(err) => {
            let path = (!err.path().is_empty()).then(|| err.path().to_string());
            let response = error_response(err.code().code(), &err.to_string(), path);
            (response, Err(CliError::decode_failed(err.to_string())))
        }
    }
}

/// Lists every schema in `schema_dir` with its fields.
pub fn list_schemas(schema_dir: &Path) -> CliResult<()> {
    let registry = SchemaRegistry::load(schema_dir)?;
    write_response(&success_response(describe_registry(&registry)))
}

fn describe_registry(registry: &SchemaRegistry) -> Value {
    let schemas: Vec<Value> = registry
        .names()
        .filter_map(|name| registry.get(name))
        .map(|schema| {
            let fields: Vec<Value> = schema
                .schema()
                .fields()
                .iter()
                .map(|field| {
                    json!({
                        "name": field.display_name(),
                        "key": field.payload_key(),
                        "type": field.type_name(),
                        "kind": field.kind().as_str(),
                        "requirement": field.requirement().as_str(),
                    })
                })
                .collect();
            json!({ "name": schema.name(), "fields": fields })
        })
        .collect();

    json!({ "schemas": schemas })
}
