//! Random forest trainer.
//!
//! Fits an ensemble of CART regression trees on bootstrap samples drawn
//! with a seeded LCG stream per tree. Identical datasets and configuration
//! produce bit-identical forests on every platform.

use glucast_core::{ForestModel, SCALE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::Dataset;
use crate::deterministic::LcgRng;
use crate::errors::TrainerError;

/// Forest hyperparameters.
///
/// The seed is an explicit configuration value so reproducibility is a
/// stated contract rather than an incidental library default.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub quant_step: i64,
    pub seed: i64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: 8,
            min_samples_leaf: 1,
            quant_step: 1000,
            seed: 42,
        }
    }
}

/// Trains [`ForestModel`]s from datasets. Every call to `train` refits from
/// scratch; there is no incremental update path.
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn train(&self, dataset: &Dataset) -> Result<ForestModel, TrainerError> {
        if dataset.is_empty() {
            return Err(TrainerError::Dataset("dataset has no examples".to_string()));
        }

        info!(
            examples = dataset.len(),
            features = dataset.feature_count(),
            trees = self.config.num_trees,
            seed = self.config.seed,
            "Training random forest"
        );

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_leaf: self.config.min_samples_leaf,
            quant_step: self.config.quant_step,
        };

        let mut trees = Vec::with_capacity(self.config.num_trees);
        let mut gains = vec![0i128; dataset.feature_count()];

        for tree_idx in 0..self.config.num_trees {
            let mut rng = LcgRng::for_tree(self.config.seed, tree_idx);
            let indices = rng.bootstrap_indices(dataset.len(), dataset.len());

            let features: Vec<Vec<i64>> = indices
                .iter()
                .map(|&i| dataset.features()[i].clone())
                .collect();
            let targets: Vec<i64> = indices.iter().map(|&i| dataset.targets()[i]).collect();

            let build = CartBuilder::new(&features, &targets, tree_config.clone()).build();

            debug!(
                tree = tree_idx,
                nodes = build.tree.nodes.len(),
                "Built tree"
            );

            for (f, gain) in build.feature_gains.iter().enumerate() {
                gains[f] += gain;
            }
            trees.push(build.tree);
        }

        let importances = normalize_importances(&gains);
        let model = ForestModel::new(dataset.feature_count() as u16, trees, importances);
        model.validate()?;

        info!(trees = model.trees.len(), "Training complete");
        Ok(model)
    }
}

/// Normalizes accumulated gains so the importances sum to exactly [`SCALE`].
///
/// Integer division leaves a remainder of at most `len - 1` micro units; it
/// is assigned to the highest-gain feature (lowest index on ties) so the
/// invariant holds without perturbing the ranking.
fn normalize_importances(gains: &[i128]) -> Vec<i64> {
    let total: i128 = gains.iter().sum();
    if total <= 0 {
        return vec![0; gains.len()];
    }

    let mut importances: Vec<i64> = gains
        .iter()
        .map(|&g| ((g * SCALE as i128) / total) as i64)
        .collect();

    let assigned: i64 = importances.iter().sum();
    let remainder = SCALE - assigned;
    if remainder > 0 {
        let top = gains
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        importances[top] += remainder;
    }

    importances
}

#[cfg(test)]
mod tests {
    use super::*;
    use glucast_core::{GlucoseRecord, MealEncoder, Regressor};

    fn training_records() -> Vec<GlucoseRecord> {
        let meals = ["breakfast", "lunch", "dinner"];
        (0..12)
            .map(|i| GlucoseRecord {
                hour: (7 + (i % 3) * 6) as u8,
                day_of_week: (i % 7) as u8,
                meal_type: meals[i % 3].to_string(),
                last_glucose: 100.0 + (i as f64) * 5.0,
            })
            .collect()
    }

    fn small_forest_config() -> ForestConfig {
        ForestConfig {
            num_trees: 10,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn trains_the_configured_number_of_trees() {
        let encoder = MealEncoder::standard();
        let dataset = Dataset::from_records(&training_records(), &encoder).unwrap();
        let model = ForestTrainer::new(small_forest_config()).train(&dataset).unwrap();
        assert_eq!(model.trees.len(), 10);
        assert_eq!(model.feature_count, 4);
    }

    #[test]
    fn retraining_is_bit_identical() {
        let encoder = MealEncoder::standard();
        let dataset = Dataset::from_records(&training_records(), &encoder).unwrap();
        let trainer = ForestTrainer::new(small_forest_config());

        let a = trainer.train(&dataset).unwrap();
        let b = trainer.train(&dataset).unwrap();

        assert_eq!(a, b);
        for (ta, tb) in a.trees.iter().zip(b.trees.iter()) {
            assert_eq!(ta.nodes, tb.nodes);
        }
    }

    #[test]
    fn different_seeds_produce_different_forests() {
        let encoder = MealEncoder::standard();
        let dataset = Dataset::from_records(&training_records(), &encoder).unwrap();

        let a = ForestTrainer::new(small_forest_config()).train(&dataset).unwrap();
        let b = ForestTrainer::new(ForestConfig {
            seed: 43,
            ..small_forest_config()
        })
        .train(&dataset)
        .unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn importances_sum_to_scale_when_splits_exist() {
        let encoder = MealEncoder::standard();
        let dataset = Dataset::from_records(&training_records(), &encoder).unwrap();
        let model = ForestTrainer::new(small_forest_config()).train(&dataset).unwrap();

        let total: i64 = model.feature_importances().iter().sum();
        assert_eq!(total, SCALE);
    }

    #[test]
    fn predictions_stay_within_target_range() {
        let encoder = MealEncoder::standard();
        let records = training_records();
        let dataset = Dataset::from_records(&records, &encoder).unwrap();
        let model = ForestTrainer::new(small_forest_config()).train(&dataset).unwrap();

        let (min, max, _) = dataset.target_stats();
        for features in dataset.features() {
            let p = model.predict(features);
            assert!(p >= min && p <= max, "prediction {p} outside [{min}, {max}]");
        }
    }

    #[test]
    fn zero_gains_normalize_to_zeros() {
        let gains = vec![0i128; 4];
        assert_eq!(normalize_importances(&gains), vec![0, 0, 0, 0]);
    }

    #[test]
    fn normalization_distributes_the_remainder() {
        let gains = vec![1i128, 1, 1];
        let importances = normalize_importances(&gains);
        assert_eq!(importances.iter().sum::<i64>(), SCALE);
    }
}
