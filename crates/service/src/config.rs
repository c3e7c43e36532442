//! Service configuration.
//!
//! Loads from a TOML file when one is provided, otherwise starts from
//! defaults; a small set of environment variables can override individual
//! values either way.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use glucast_trainer::ForestConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Path of the persisted model artifact.
    pub model_path: PathBuf,
    /// Path of the persisted vocabulary snapshot.
    pub encoder_path: PathBuf,
    /// Forest hyperparameters used for every training run.
    pub forest: ForestConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/glucast-model.bin"),
            encoder_path: PathBuf::from("models/glucast-encoder.json"),
            forest: ForestConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parses a TOML config file and applies environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ServiceError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ServiceError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config: ServiceConfig = toml::from_str(&content).map_err(|e| {
            ServiceError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from `path` when given and present, otherwise
    /// from defaults. Environment overrides apply in every case.
    pub fn load(path: Option<&Path>) -> Result<Self, ServiceError> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            Some(p) => {
                warn!(path = %p.display(), "Config file not found, using defaults");
                Ok(Self::from_env())
            }
            None => Ok(Self::from_env()),
        }
    }

    fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("GLUCAST_MODEL_PATH") {
            self.model_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("GLUCAST_ENCODER_PATH") {
            self.encoder_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("GLUCAST_SEED") {
            match v.parse() {
                Ok(seed) => self.forest.seed = seed,
                Err(_) => warn!(value = %v, "Ignoring invalid GLUCAST_SEED"),
            }
        }
    }
}
