//! Error types for the core pipeline.

use thiserror::Error;

/// Errors produced by encoding, feature building, model evaluation, and
/// artifact persistence.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown meal category: {label}")]
    UnknownCategory { label: String },

    #[error("Record field {field} out of range: {value}")]
    InvalidRecord { field: &'static str, value: i64 },

    #[error("Model validation failed: {0}")]
    InvalidModel(String),

    #[error("Artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact encode error: {0}")]
    Encode(String),

    #[error("Artifact decode error: {0}")]
    Decode(String),

    #[error("Artifact hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch { expected: String, computed: String },

    #[error("Vocabulary snapshot does not match the standard vocabulary")]
    VocabularyMismatch,

    #[error("Incomplete artifact pair: {missing} is missing")]
    IncompleteArtifact { missing: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
