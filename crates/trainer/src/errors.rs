//! Trainer error types.

use glucast_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Need at least {needed} records to train, got {got}")]
    InsufficientData { got: usize, needed: usize },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
