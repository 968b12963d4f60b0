//! Error types for the AgriCast core

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the AgriCast core
#[derive(Error, Debug)]
pub enum CoreError {
    /// Dataset could not be read or parsed
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Category value was never seen when the encoder was fitted
    #[error("unknown {field} category: {value:?}")]
    UnknownCategory { field: String, value: String },

    /// Encoded value is outside the fitted class range
    #[error("{field} code {code} out of range ({classes} classes)")]
    CodeOutOfRange {
        field: String,
        code: usize,
        classes: usize,
    },

    /// Model validation failed
    #[error("model validation failed: {0}")]
    ValidationFailed(String),

    /// Feature vector does not match the model's expected shape
    #[error("expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    /// Required artifact file is absent
    #[error("missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Artifact bytes do not match the recorded sidecar hash
    #[error("artifact hash mismatch for {}: expected {expected}, got {actual}", .path.display())]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for AgriCast core operations
pub type Result<T> = std::result::Result<T, CoreError>;
