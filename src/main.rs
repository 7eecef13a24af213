//! lenient-json CLI entry point
//!
//! Parses arguments and dispatches to the CLI module. Errors go to stderr
//! and exit non-zero; any response has already been written to stdout.

use lenient_json::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
