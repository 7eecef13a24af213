//! CLI module
//!
//! - decode: decode one payload against a loaded schema
//! - schemas: list the schemas in a definition directory

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{decode, init_tracing, list_schemas, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_payload, write_response};
