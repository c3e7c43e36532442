//! Service-level error type.
//!
//! Collapses core and trainer failures into the taxonomy exposed to the
//! transport collaborator. Nothing is absorbed into a default prediction or
//! a fallback category code.

use glucast_core::CoreError;
use glucast_trainer::TrainerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Model not trained yet")]
    ModelNotReady,

    #[error("Unknown meal category: {label}")]
    UnknownCategory { label: String },

    #[error("Need at least {needed} records to train, got {got}")]
    InsufficientData { got: usize, needed: usize },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownCategory { label } => ServiceError::UnknownCategory { label },
            CoreError::InvalidRecord { field, value } => {
                ServiceError::InvalidRecord(format!("{field} out of range: {value}"))
            }
            other => ServiceError::Persistence(other.to_string()),
        }
    }
}

impl From<TrainerError> for ServiceError {
    fn from(err: TrainerError) -> Self {
        match err {
            TrainerError::InsufficientData { got, needed } => {
                ServiceError::InsufficientData { got, needed }
            }
            TrainerError::Dataset(msg) => ServiceError::Training(msg),
            TrainerError::Core(core) => core.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
