//! CLI-specific error types

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Schema directory failed to load or compile
    SchemaError,
    /// I/O error (stdin/stdout/input file)
    IoError,
    /// Payload failed to decode
    DecodeFailed,
    /// Payload decoded with warnings under `--deny-warnings`
    WarningsDenied,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLI_CONFIG_ERROR",
            Self::SchemaError => "CLI_SCHEMA_ERROR",
            Self::IoError => "CLI_IO_ERROR",
            Self::DecodeFailed => "CLI_DECODE_FAILED",
            Self::WarningsDenied => "CLI_WARNINGS_DENIED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn decode_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::DecodeFailed, msg)
    }

    pub fn warnings_denied(count: usize) -> Self {
        Self::new(
            CliErrorCode::WarningsDenied,
            format!("{} parse warning(s) with --deny-warnings", count),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
