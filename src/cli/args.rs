//! CLI argument definitions using clap
//!
//! Commands:
//! - lenient-json decode --schemas <dir> --schema <name>
//! - lenient-json schemas --schemas <dir>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Decode JSON against loaded schemas, reporting optional-field failures as warnings
#[derive(Parser, Debug)]
#[command(name = "lenient-json")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode one JSON payload
    Decode {
        /// Directory of schema definition files
        #[arg(long)]
        schemas: PathBuf,

        /// Name of the schema to decode into
        #[arg(long)]
        schema: String,

        /// Path to decoder configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Payload file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Treat parse warnings as failure
        #[arg(long)]
        deny_warnings: bool,
    },

    /// List the schemas in a directory
    Schemas {
        /// Directory of schema definition files
        #[arg(long)]
        schemas: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
