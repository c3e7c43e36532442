//! Fixed-vocabulary meal category encoder.
//!
//! Category codes are positions in a frozen, ordered label set. The encoder
//! is constructed explicitly at startup; there is no first-use fitting, so
//! codes never depend on which label happened to arrive first.

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// The fixed meal vocabulary, in code order.
pub const STANDARD_VOCABULARY: [&str; 5] = ["none", "breakfast", "lunch", "dinner", "other"];

/// Maps meal labels to stable integer codes and back.
#[derive(Debug, Clone, PartialEq)]
pub struct MealEncoder {
    labels: Vec<String>,
}

impl MealEncoder {
    /// Builds the encoder over [`STANDARD_VOCABULARY`].
    pub fn standard() -> Self {
        Self {
            labels: STANDARD_VOCABULARY.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns the code for `label`, or `UnknownCategory` if the label is
    /// not in the vocabulary. No fallback code is ever substituted.
    pub fn encode(&self, label: &str) -> Result<i64, CoreError> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|pos| pos as i64)
            .ok_or_else(|| CoreError::UnknownCategory {
                label: label.to_string(),
            })
    }

    /// Returns the label for `code`, if the code is in range.
    pub fn decode(&self, code: i64) -> Option<&str> {
        if code < 0 {
            return None;
        }
        self.labels.get(code as usize).map(|l| l.as_str())
    }

    /// Number of known categories.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Serializable copy of the label set, stored alongside every trained
    /// model so an artifact records exactly which codes it was trained with.
    pub fn snapshot(&self) -> VocabularySnapshot {
        VocabularySnapshot {
            labels: self.labels.clone(),
        }
    }

    /// Rebuilds an encoder from a persisted snapshot.
    ///
    /// Rejects snapshots that disagree with [`STANDARD_VOCABULARY`]: a model
    /// trained against a different label set would map codes to the wrong
    /// categories.
    pub fn from_snapshot(snapshot: &VocabularySnapshot) -> Result<Self, CoreError> {
        let standard = Self::standard();
        if snapshot.labels != standard.labels {
            return Err(CoreError::VocabularyMismatch);
        }
        Ok(standard)
    }
}

/// Persisted form of the encoder's label set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularySnapshot {
    pub labels: Vec<String>,
}
