//! Model artifact persistence.
//!
//! A trained model is stored as a pair of files that are only ever read or
//! written together: the forest parameters as bincode (wrapped in an
//! envelope carrying a blake3 content hash) and the vocabulary snapshot as
//! human-readable JSON. Writes go to a temp file first and are renamed into
//! place for atomicity.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::encoder::VocabularySnapshot;
use crate::errors::CoreError;
use crate::forest::ForestModel;

/// Envelope wrapping the serialized model with its content hash.
#[derive(Debug, Serialize, Deserialize)]
struct ModelEnvelope {
    /// Hex blake3 hash of `model_bytes`.
    model_hash: String,
    /// Bincode-serialized [`ForestModel`].
    model_bytes: Vec<u8>,
}

/// Reads and writes the model/vocabulary artifact pair.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    model_path: PathBuf,
    encoder_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(model_path: impl Into<PathBuf>, encoder_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            encoder_path: encoder_path.into(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn encoder_path(&self) -> &Path {
        &self.encoder_path
    }

    /// Persists the model and its vocabulary snapshot. Returns the hex
    /// blake3 hash of the model bytes.
    ///
    /// Each file is written to a sibling temp file and renamed into place,
    /// so a crash mid-write leaves the previous artifact readable.
    pub fn save(
        &self,
        model: &ForestModel,
        snapshot: &VocabularySnapshot,
    ) -> Result<String, CoreError> {
        let model_bytes =
            bincode::serialize(model).map_err(|e| CoreError::Encode(e.to_string()))?;
        let model_hash = hex::encode(blake3::hash(&model_bytes).as_bytes());

        let envelope = ModelEnvelope {
            model_hash: model_hash.clone(),
            model_bytes,
        };
        let envelope_bytes =
            bincode::serialize(&envelope).map_err(|e| CoreError::Encode(e.to_string()))?;
        let vocab_json =
            serde_json::to_string_pretty(snapshot).map_err(|e| CoreError::Encode(e.to_string()))?;

        if let Some(parent) = self.model_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if let Some(parent) = self.encoder_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        write_atomic(&self.model_path, &envelope_bytes)?;
        write_atomic(&self.encoder_path, vocab_json.as_bytes())?;

        info!(
            model_path = %self.model_path.display(),
            encoder_path = %self.encoder_path.display(),
            hash = %model_hash,
            "Saved model artifact pair"
        );
        Ok(model_hash)
    }

    /// Loads the artifact pair.
    ///
    /// Returns `Ok(None)` when neither file exists (a fresh deployment).
    /// Exactly one file present, a hash mismatch, a decode failure, or a
    /// model that fails validation are all persistence errors; a half-read
    /// artifact is never returned.
    pub fn load(&self) -> Result<Option<(ForestModel, VocabularySnapshot)>, CoreError> {
        let model_exists = self.model_path.exists();
        let encoder_exists = self.encoder_path.exists();

        match (model_exists, encoder_exists) {
            (false, false) => {
                debug!(
                    model_path = %self.model_path.display(),
                    "No artifact pair on disk"
                );
                return Ok(None);
            }
            (true, false) => {
                return Err(CoreError::IncompleteArtifact {
                    missing: self.encoder_path.display().to_string(),
                });
            }
            (false, true) => {
                return Err(CoreError::IncompleteArtifact {
                    missing: self.model_path.display().to_string(),
                });
            }
            (true, true) => {}
        }

        let envelope_bytes = fs::read(&self.model_path)?;
        let envelope: ModelEnvelope =
            bincode::deserialize(&envelope_bytes).map_err(|e| CoreError::Decode(e.to_string()))?;

        let computed = hex::encode(blake3::hash(&envelope.model_bytes).as_bytes());
        if computed != envelope.model_hash {
            return Err(CoreError::HashMismatch {
                expected: envelope.model_hash,
                computed,
            });
        }

        let model: ForestModel = bincode::deserialize(&envelope.model_bytes)
            .map_err(|e| CoreError::Decode(e.to_string()))?;
        model.validate()?;

        let vocab_json = fs::read_to_string(&self.encoder_path)?;
        let snapshot: VocabularySnapshot =
            serde_json::from_str(&vocab_json).map_err(|e| CoreError::Decode(e.to_string()))?;

        info!(
            hash = %envelope.model_hash,
            trees = model.trees.len(),
            "Loaded model artifact pair"
        );
        Ok(Some((model, snapshot)))
    }
}

/// Writes `bytes` to a sibling `.tmp` file and renames it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
