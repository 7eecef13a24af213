//! Schema construction and loading errors

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    // Declaration errors
    #[error("Schema '{record}' declares payload key '{key}' more than once")]
    DuplicateKey { record: String, key: String },

    #[error("Schema '{record}' declares field '{field}' more than once")]
    DuplicateField { record: String, field: String },

    #[error("Schema '{record}' field '{field}': {reason}")]
    InvalidField {
        record: String,
        field: String,
        reason: String,
    },

    #[error("Unknown requirement tag '{0}' (expected \"required\" or \"optional\")")]
    UnknownRequirement(String),

    // Registry errors
    #[error("Schema '{0}' not found")]
    UnknownSchema(String),

    #[error("Schema '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Schema reference cycle: {0}")]
    Cycle(String),

    // Loading errors
    #[error("Malformed schema file '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

impl SchemaError {
    pub fn invalid_field(
        record: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SchemaError::InvalidField {
            record: record.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchemaError::DuplicateKey {
            record: "users".into(),
            key: "name".into(),
        };
        let display = err.to_string();
        assert!(display.contains("users"));
        assert!(display.contains("name"));
    }

    #[test]
    fn test_cycle_display() {
        let err = SchemaError::Cycle("a -> b -> a".into());
        assert_eq!(err.to_string(), "Schema reference cycle: a -> b -> a");
    }
}
