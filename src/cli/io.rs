//! JSON I/O handling for CLI
//!
//! - Input: one JSON payload from a file or stdin, read whole
//! - Output: one JSON response object on stdout

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::decode::{DecodeError, ParseWarning};

use super::errors::{CliError, CliResult};

/// Reads the payload bytes from `input`, or stdin when `None`.
pub fn read_payload(input: Option<&Path>) -> CliResult<Vec<u8>> {
    let payload = match input {
        Some(path) => fs::read(path)
            .map_err(|e| CliError::io_error(format!("{}: {}", path.display(), e)))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            buf
        }
    };

    if payload.iter().all(u8::is_ascii_whitespace) {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(payload)
}

pub fn warning_json(warning: &DecodeError) -> Value {
    json!({
        "code": warning.code().code(),
        "record": warning.record(),
        "path": warning.path().to_string(),
        "expected": warning.expected(),
        "value": warning.value(),
        "message": warning.to_string(),
    })
}

pub fn success_response(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

pub fn warnings_response(data: Value, warnings: &ParseWarning) -> Value {
    json!({
        "status": "warnings",
        "data": data,
        "warnings": warnings.iter().map(warning_json).collect::<Vec<_>>()
    })
}

pub fn error_response(code: &str, message: &str, path: Option<String>) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message,
        "path": path
    })
}

/// Writes one response object to stdout.
pub fn write_response(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_payload_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("payload.json");
        fs::write(&path, br#"{"a": 1}"#).unwrap();
        assert_eq!(read_payload(Some(&path)).unwrap(), br#"{"a": 1}"#.to_vec());
    }

    #[test]
    fn test_read_payload_rejects_blank_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("payload.json");
        fs::write(&path, "  \n").unwrap();
        assert!(read_payload(Some(&path)).is_err());
    }

    #[test]
    fn test_warnings_response_shape() {
        let mut warnings = ParseWarning::new();
        warnings.push(DecodeError::type_mismatch("42", "string").rehome("Name", "users"));

        let response = warnings_response(json!({"Name": ""}), &warnings);
        assert_eq!(response["status"], "warnings");
        assert_eq!(response["warnings"][0]["path"], "Name");
        assert_eq!(response["warnings"][0]["code"], "DECODE_TYPE_MISMATCH");
        assert_eq!(response["warnings"][0]["value"], "42");
    }
}
