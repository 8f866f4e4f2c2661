//! Error types for registry operations.
//!
//! Covers reading and parsing definition files and compiling definitions
//! into schemas. Validation failures are not errors here; they are reported
//! through [`ValidationOutcome`](crate::ValidationOutcome).

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while loading definitions or looking up schemas.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A string `pattern` is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A `default` value does not fit the schema's output type.
    #[error("invalid default for {kind} schema: {value}")]
    InvalidDefault { kind: &'static str, value: Value },

    /// A definition carries a key its kind does not recognize.
    #[error("unknown field '{field}' in {kind} definition")]
    UnknownField { kind: &'static str, field: String },

    /// A `ref` names a schema that is not defined before it.
    #[error("unknown schema reference: {0}")]
    UnknownReference(String),

    /// Two definitions in one file share a name.
    #[error("duplicate schema name: {0}")]
    DuplicateSchema(String),

    /// Lookup of a name that is not registered.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// All configured builder sources failed.
    #[error("no registry sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
