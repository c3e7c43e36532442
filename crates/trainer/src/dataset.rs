//! Training dataset construction.
//!
//! Turns an ordered record sequence into supervised examples with the
//! next-step shift: the features of record *i* predict the glucose reading
//! of record *i + 1*.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use glucast_core::{build_features, to_micro, FeatureVector, GlucoseRecord, MealEncoder};

use crate::errors::TrainerError;

/// Minimum number of records required to build a dataset.
pub const MIN_TRAINING_RECORDS: usize = 5;

/// A supervised training dataset in micro fixed-point units.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Vec<FeatureVector>,
    targets: Vec<i64>,
    feature_count: usize,
}

impl Dataset {
    /// Builds a dataset from an ordered record sequence.
    ///
    /// Records must be submitted in chronological order; the shift transform
    /// pairs each record with its successor and no reordering is applied
    /// here. `N` records produce exactly `N - 1` examples.
    pub fn from_records(
        records: &[GlucoseRecord],
        encoder: &MealEncoder,
    ) -> Result<Self, TrainerError> {
        if records.len() < MIN_TRAINING_RECORDS {
            return Err(TrainerError::InsufficientData {
                got: records.len(),
                needed: MIN_TRAINING_RECORDS,
            });
        }

        let mut features = Vec::with_capacity(records.len() - 1);
        let mut targets = Vec::with_capacity(records.len() - 1);

        for window in records.windows(2) {
            features.push(build_features(&window[0], encoder)?);
            targets.push(to_micro(window[1].last_glucose));
        }

        let feature_count = features[0].len();
        Ok(Self {
            features,
            targets,
            feature_count,
        })
    }

    /// Parses records from a CSV file with rows
    /// `hour,day_of_week,meal_type,last_glucose`. Empty lines and lines
    /// starting with `#` are skipped.
    pub fn records_from_csv(path: &Path) -> anyhow::Result<Vec<GlucoseRecord>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read records file: {}", path.display()))?;

        let mut records = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split(',').map(|p| p.trim()).collect();
            if parts.len() != 4 {
                bail!(
                    "Line {}: expected 4 columns (hour,day_of_week,meal_type,last_glucose), got {}",
                    line_num + 1,
                    parts.len()
                );
            }

            let hour: u8 = parts[0]
                .parse()
                .with_context(|| format!("Line {}: invalid hour '{}'", line_num + 1, parts[0]))?;
            let day_of_week: u8 = parts[1].parse().with_context(|| {
                format!("Line {}: invalid day_of_week '{}'", line_num + 1, parts[1])
            })?;
            let last_glucose: f64 = parts[3].parse().with_context(|| {
                format!("Line {}: invalid last_glucose '{}'", line_num + 1, parts[3])
            })?;

            records.push(GlucoseRecord {
                hour,
                day_of_week,
                meal_type: parts[2].to_string(),
                last_glucose,
            });
        }

        Ok(records)
    }

    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn targets(&self) -> &[i64] {
        &self.targets
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// (min, max, mean) of the micro-scaled targets, for training summaries.
    pub fn target_stats(&self) -> (i64, i64, i64) {
        if self.targets.is_empty() {
            return (0, 0, 0);
        }
        let min = *self.targets.iter().min().unwrap_or(&0);
        let max = *self.targets.iter().max().unwrap_or(&0);
        let sum: i128 = self.targets.iter().map(|&t| t as i128).sum();
        let mean = (sum / self.targets.len() as i128) as i64;
        (min, max, mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glucast_core::SCALE;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(hour: u8, meal: &str, glucose: f64) -> GlucoseRecord {
        GlucoseRecord {
            hour,
            day_of_week: hour % 7,
            meal_type: meal.to_string(),
            last_glucose: glucose,
        }
    }

    fn six_records() -> Vec<GlucoseRecord> {
        vec![
            record(7, "breakfast", 95.0),
            record(12, "lunch", 140.0),
            record(19, "dinner", 130.0),
            record(7, "breakfast", 98.0),
            record(12, "lunch", 150.0),
            record(19, "dinner", 135.0),
        ]
    }

    #[test]
    fn shift_produces_n_minus_one_examples() {
        let encoder = MealEncoder::standard();
        let dataset = Dataset::from_records(&six_records(), &encoder).unwrap();
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.feature_count(), 4);
    }

    #[test]
    fn targets_come_from_the_next_record() {
        let encoder = MealEncoder::standard();
        let records = six_records();
        let dataset = Dataset::from_records(&records, &encoder).unwrap();
        for (i, &target) in dataset.targets().iter().enumerate() {
            assert_eq!(target, to_micro(records[i + 1].last_glucose));
        }
    }

    #[test]
    fn fewer_than_five_records_is_insufficient() {
        let encoder = MealEncoder::standard();
        let records = six_records()[..4].to_vec();
        let err = Dataset::from_records(&records, &encoder).unwrap_err();
        match err {
            TrainerError::InsufficientData { got, needed } => {
                assert_eq!(got, 4);
                assert_eq!(needed, MIN_TRAINING_RECORDS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exactly_five_records_is_enough() {
        let encoder = MealEncoder::standard();
        let records = six_records()[..5].to_vec();
        let dataset = Dataset::from_records(&records, &encoder).unwrap();
        assert_eq!(dataset.len(), 4);
    }

    #[test]
    fn unknown_meal_fails_dataset_build() {
        let encoder = MealEncoder::standard();
        let mut records = six_records();
        records[2].meal_type = "snack".to_string();
        assert!(Dataset::from_records(&records, &encoder).is_err());
    }

    #[test]
    fn submission_order_is_preserved() {
        let encoder = MealEncoder::standard();
        let records = six_records();
        let dataset = Dataset::from_records(&records, &encoder).unwrap();
        assert_eq!(dataset.features()[0][0], 7 * SCALE);
        assert_eq!(dataset.features()[1][0], 12 * SCALE);
        assert_eq!(dataset.features()[4][0], 12 * SCALE);
    }

    #[test]
    fn csv_loader_parses_rows_and_skips_comments() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# hour,day_of_week,meal_type,last_glucose").unwrap();
        writeln!(file, "7,0,breakfast,95.5").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "12,0,lunch,140.0").unwrap();

        let records = Dataset::records_from_csv(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hour, 7);
        assert_eq!(records[0].meal_type, "breakfast");
        assert!((records[1].last_glucose - 140.0).abs() < 1e-9);
    }

    #[test]
    fn csv_loader_rejects_short_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "7,0,breakfast").unwrap();
        assert!(Dataset::records_from_csv(file.path()).is_err());
    }

    #[test]
    fn target_stats_cover_the_range() {
        let encoder = MealEncoder::standard();
        let dataset = Dataset::from_records(&six_records(), &encoder).unwrap();
        let (min, max, mean) = dataset.target_stats();
        assert_eq!(min, to_micro(98.0));
        assert_eq!(max, to_micro(150.0));
        assert!(mean >= min && mean <= max);
    }
}
