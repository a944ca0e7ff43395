//! Schema registry error types.

use thiserror::Error;

use lintel_core::SchemaType;

use crate::registry::SchemaViolation;

/// Errors from loading or querying the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The registry has no compiled schema of this type.
    #[error("Schema not loaded: {0}")]
    NotFound(SchemaType),

    /// The schema source has no file at the requested path.
    #[error("Failed to read schema file {path}: {reason}")]
    MissingSource { path: String, reason: String },

    /// The schema file is not valid JSON.
    #[error("Failed to parse schema JSON {path}: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The schema JSON is not a valid draft-07 schema.
    #[error("Failed to compile {schema} schema: {message}")]
    Compile { schema: SchemaType, message: String },

    /// An instance did not pass schema validation.
    #[error("Validation failed: {}", format_violations(.violations))]
    ValidationFailed { violations: Vec<SchemaViolation> },

    /// The schema map lock was poisoned by a panicking writer.
    #[error("Schema registry lock poisoned")]
    LockPoisoned,
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
