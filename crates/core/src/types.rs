//! Common data structures for records, predictions, and training reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Fixed-point scale for deterministic arithmetic (micro units).
///
/// All model math operates on `i64` values scaled by 1e6. Floating point
/// appears only at the API boundary when records enter and predictions leave.
pub const SCALE: i64 = 1_000_000;

/// Converts a boundary `f64` into micro fixed-point units.
pub fn to_micro(value: f64) -> i64 {
    (value * SCALE as f64).round() as i64
}

/// Converts micro fixed-point units back into a boundary `f64`.
pub fn from_micro(value: i64) -> f64 {
    value as f64 / SCALE as f64
}

/// One submitted glucose observation.
///
/// Request-scoped and immutable once received. `hour` and `day_of_week` are
/// validated before any feature construction; `meal_type` is resolved against
/// the fixed meal vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseRecord {
    /// Hour of day, 0..=23.
    pub hour: u8,
    /// Day of week, 0..=6 (Monday = 0).
    pub day_of_week: u8,
    /// Meal category label, e.g. "breakfast".
    pub meal_type: String,
    /// Most recent glucose reading in mg/dL.
    pub last_glucose: f64,
}

impl GlucoseRecord {
    /// Checks the numeric ranges of the record fields.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.hour > 23 {
            return Err(CoreError::InvalidRecord {
                field: "hour",
                value: self.hour as i64,
            });
        }
        if self.day_of_week > 6 {
            return Err(CoreError::InvalidRecord {
                field: "day_of_week",
                value: self.day_of_week as i64,
            });
        }
        Ok(())
    }
}

/// Result of a single inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted next glucose reading in mg/dL.
    pub predicted_glucose: f64,
    /// Mean feature importance scaled to [0, 100].
    ///
    /// Static per trained model; a weak proxy, not a per-request
    /// uncertainty estimate.
    pub confidence: f64,
}

/// Summary returned after a successful training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    /// Number of records submitted.
    pub records: usize,
    /// Number of training examples produced by the next-step shift.
    pub examples: usize,
    /// Completion timestamp.
    pub trained_at: DateTime<Utc>,
    /// Hex blake3 hash of the persisted model bytes.
    pub model_hash: String,
}
