//! Schema validation and migration error types.

use thiserror::Error;

/// Errors from the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// JSON value did not pass schema validation.
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// Individual error messages from the validator.
        errors: Vec<String>,
    },

    /// Schema generation or compilation error.
    #[error("Schema generation error: {0}")]
    Generation(String),
}

/// Errors upgrading a stored value to the current shape.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Stored value is not an object (schema version {version})")]
    NotAnObject { version: u32 },

    #[error("Unsupported schema version {0}")]
    UnsupportedVersion(u32),

    #[error("Unknown activity action: {0}")]
    UnknownAction(String),

    #[error("Failed to decode upgraded value: {0}")]
    Decode(#[from] serde_json::Error),
}
