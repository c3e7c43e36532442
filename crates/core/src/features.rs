//! Deterministic feature construction from glucose records.

use crate::encoder::MealEncoder;
use crate::errors::CoreError;
use crate::types::{to_micro, GlucoseRecord, SCALE};

/// A feature vector of micro fixed-point values.
pub type FeatureVector = Vec<i64>;

/// Width of every feature vector.
pub const FEATURE_COUNT: usize = 4;

/// Builds the feature vector for one record.
///
/// Feature order is invariant:
/// 0. hour of day
/// 1. day of week
/// 2. meal category code
/// 3. last glucose reading
///
/// All values are scaled to micro units on entry so that training and
/// inference stay in integer arithmetic.
pub fn build_features(
    record: &GlucoseRecord,
    encoder: &MealEncoder,
) -> Result<FeatureVector, CoreError> {
    record.validate()?;
    let meal_code = encoder.encode(&record.meal_type)?;

    Ok(vec![
        record.hour as i64 * SCALE,
        record.day_of_week as i64 * SCALE,
        meal_code * SCALE,
        to_micro(record.last_glucose),
    ])
}
