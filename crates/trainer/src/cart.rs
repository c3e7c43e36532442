//! CART regression tree builder.
//!
//! Deterministic exact-greedy construction over quantized thresholds with
//! fixed-point arithmetic only. Split quality is measured as the reduction
//! in sum of squared errors; leaf values are integer target means.

use std::collections::BTreeMap;

use glucast_core::{Node, Tree};

use crate::deterministic::SplitTieBreaker;

/// Construction parameters for a single tree.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub quant_step: i64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            min_samples_leaf: 1,
            quant_step: 1000,
        }
    }
}

#[derive(Clone, Debug)]
struct Sample {
    features: Vec<i64>,
    target: i64,
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: i64,
    gain: i128,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, threshold: i64, gain: i128, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            gain,
            tie_breaker: SplitTieBreaker::new(feature_idx, threshold, node_id),
        }
    }
}

/// Result of building one tree: the tree itself plus the split gain each
/// feature contributed, for forest-level importance aggregation.
#[derive(Debug, Clone)]
pub struct TreeBuild {
    pub tree: Tree,
    pub feature_gains: Vec<i128>,
}

/// Builds a regression tree with the exact-greedy CART algorithm.
pub struct CartBuilder {
    config: TreeConfig,
    samples: Vec<Sample>,
    feature_count: usize,
}

impl CartBuilder {
    pub fn new(features: &[Vec<i64>], targets: &[i64], config: TreeConfig) -> Self {
        assert_eq!(features.len(), targets.len());

        let samples: Vec<Sample> = features
            .iter()
            .zip(targets.iter())
            .map(|(f, &t)| Sample {
                features: f.clone(),
                target: t,
            })
            .collect();

        let feature_count = if samples.is_empty() {
            0
        } else {
            samples[0].features.len()
        };

        Self {
            config,
            samples,
            feature_count,
        }
    }

    pub fn build(&self) -> TreeBuild {
        let mut nodes = Vec::new();
        let mut feature_gains = vec![0i128; self.feature_count];
        let indices: Vec<usize> = (0..self.samples.len()).collect();

        self.build_node(&indices, 0, &mut nodes, 0, &mut feature_gains);

        TreeBuild {
            tree: Tree::new(nodes),
            feature_gains,
        }
    }

    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        node_id: usize,
        feature_gains: &mut [i128],
    ) -> u16 {
        let current_idx = nodes.len() as u16;
        let leaf_value = self.mean_target(indices);

        if depth >= self.config.max_depth || indices.len() < 2 * self.config.min_samples_leaf {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        let split = match self.find_best_split(indices, node_id) {
            Some(s) if s.gain > 0 => s,
            _ => {
                nodes.push(Node::leaf(leaf_value));
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        if left_indices.len() < self.config.min_samples_leaf
            || right_indices.len() < self.config.min_samples_leaf
        {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        feature_gains[split.feature_idx] += split.gain;

        // Reserve the current slot, then patch child indices after recursion.
        nodes.push(Node::internal(split.feature_idx as u16, split.threshold, 0, 0));

        let left_idx =
            self.build_node(&left_indices, depth + 1, nodes, node_id * 2 + 1, feature_gains);
        let right_idx =
            self.build_node(&right_indices, depth + 1, nodes, node_id * 2 + 2, feature_gains);

        nodes[current_idx as usize].left = left_idx;
        nodes[current_idx as usize].right = right_idx;

        current_idx
    }

    fn find_best_split(&self, indices: &[usize], node_id: usize) -> Option<SplitCandidate> {
        let mut best_split: Option<SplitCandidate> = None;
        let parent_sse = self.sum_squared_error(indices);

        for feature_idx in 0..self.feature_count {
            let thresholds = self.get_quantized_thresholds(indices, feature_idx);

            for threshold in thresholds {
                let (left_indices, right_indices) =
                    self.split_samples(indices, feature_idx, threshold);

                if left_indices.len() < self.config.min_samples_leaf
                    || right_indices.len() < self.config.min_samples_leaf
                {
                    continue;
                }

                let gain = parent_sse
                    - self.sum_squared_error(&left_indices)
                    - self.sum_squared_error(&right_indices);

                let candidate = SplitCandidate::new(feature_idx, threshold, gain, node_id);

                best_split = match best_split {
                    None => Some(candidate),
                    Some(ref current) => {
                        if gain > current.gain
                            || (gain == current.gain && candidate.tie_breaker < current.tie_breaker)
                        {
                            Some(candidate)
                        } else {
                            best_split
                        }
                    }
                };
            }
        }

        best_split
    }

    /// Unique quantized feature values over `indices`, in ascending order.
    fn get_quantized_thresholds(&self, indices: &[usize], feature_idx: usize) -> Vec<i64> {
        let mut values = BTreeMap::new();

        for &idx in indices {
            let val = self.samples[idx].features[feature_idx];
            let quantized = (val / self.config.quant_step) * self.config.quant_step;
            values.insert(quantized, ());
        }

        values.into_keys().collect()
    }

    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: i64,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut left = Vec::new();
        let mut right = Vec::new();

        for &idx in indices {
            if self.samples[idx].features[feature_idx] <= threshold {
                left.push(idx);
            } else {
                right.push(idx);
            }
        }

        (left, right)
    }

    /// Sum of squared deviations from the subset mean, computed in i128 as
    /// `sum(t^2) - sum(t)^2 / n` to avoid materializing residuals.
    fn sum_squared_error(&self, indices: &[usize]) -> i128 {
        if indices.is_empty() {
            return 0;
        }
        let mut sum = 0i128;
        let mut sum_sq = 0i128;
        for &idx in indices {
            let t = self.samples[idx].target as i128;
            sum += t;
            sum_sq += t * t;
        }
        sum_sq - (sum * sum) / indices.len() as i128
    }

    fn mean_target(&self, indices: &[usize]) -> i64 {
        if indices.is_empty() {
            return 0;
        }
        let sum: i128 = indices.iter().map(|&idx| self.samples[idx].target as i128).sum();
        (sum / indices.len() as i128) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_separable_targets() {
        let features = vec![
            vec![100_000, 200_000],
            vec![200_000, 300_000],
            vec![300_000, 400_000],
            vec![400_000, 500_000],
        ];
        let targets = vec![10_000_000, 10_000_000, 90_000_000, 90_000_000];

        let config = TreeConfig {
            max_depth: 2,
            min_samples_leaf: 1,
            quant_step: 50_000,
        };

        let build = CartBuilder::new(&features, &targets, config).build();
        let root = &build.tree.nodes[0];
        assert!(!root.is_leaf());
        assert_eq!(build.tree.evaluate(&[100_000, 200_000]), 10_000_000);
        assert_eq!(build.tree.evaluate(&[400_000, 500_000]), 90_000_000);
    }

    #[test]
    fn uniform_targets_build_a_single_leaf() {
        let features = vec![vec![100_000], vec![200_000], vec![300_000]];
        let targets = vec![50_000_000, 50_000_000, 50_000_000];

        let build = CartBuilder::new(&features, &targets, TreeConfig::default()).build();
        assert_eq!(build.tree.nodes.len(), 1);
        assert_eq!(build.tree.nodes[0].value, Some(50_000_000));
        assert!(build.feature_gains.iter().all(|&g| g == 0));
    }

    #[test]
    fn single_sample_builds_a_leaf() {
        let features = vec![vec![100_000]];
        let targets = vec![42_000_000];

        let build = CartBuilder::new(&features, &targets, TreeConfig::default()).build();
        assert_eq!(build.tree.nodes.len(), 1);
        assert_eq!(build.tree.nodes[0].value, Some(42_000_000));
    }

    #[test]
    fn committed_splits_accumulate_feature_gain() {
        let features = vec![
            vec![100_000, 0],
            vec![200_000, 0],
            vec![300_000, 0],
            vec![400_000, 0],
        ];
        let targets = vec![10_000_000, 10_000_000, 90_000_000, 90_000_000];

        let config = TreeConfig {
            max_depth: 2,
            min_samples_leaf: 1,
            quant_step: 50_000,
        };

        let build = CartBuilder::new(&features, &targets, config).build();
        assert!(build.feature_gains[0] > 0);
        assert_eq!(build.feature_gains[1], 0);
    }

    #[test]
    fn construction_is_deterministic() {
        let features = vec![
            vec![100_000, 700_000],
            vec![200_000, 600_000],
            vec![300_000, 500_000],
            vec![400_000, 400_000],
            vec![500_000, 300_000],
        ];
        let targets = vec![10_000_000, 20_000_000, 30_000_000, 40_000_000, 50_000_000];

        let config = TreeConfig {
            max_depth: 4,
            min_samples_leaf: 1,
            quant_step: 50_000,
        };

        let a = CartBuilder::new(&features, &targets, config.clone()).build();
        let b = CartBuilder::new(&features, &targets, config).build();
        assert_eq!(a.tree, b.tree);
        assert_eq!(a.feature_gains, b.feature_gains);
    }

    #[test]
    fn depth_limit_caps_tree_growth() {
        let features: Vec<Vec<i64>> = (0..32).map(|i| vec![i * 100_000]).collect();
        let targets: Vec<i64> = (0..32).map(|i| i * 1_000_000).collect();

        let config = TreeConfig {
            max_depth: 1,
            min_samples_leaf: 1,
            quant_step: 50_000,
        };

        let build = CartBuilder::new(&features, &targets, config).build();
        // One root split and two leaves at most.
        assert!(build.tree.nodes.len() <= 3);
    }
}
