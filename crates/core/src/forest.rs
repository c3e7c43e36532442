//! Integer-only random forest evaluator.
//!
//! Trees are flat node arrays evaluated with index walks; no recursion, no
//! floating point. The trainer crate builds these structures; this module
//! only evaluates and validates them.

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::features::FeatureVector;
use crate::types::SCALE;

/// Capability seam for regression backends.
///
/// The manager and transport callers depend on this trait rather than on the
/// concrete forest, so the backend can be swapped without touching callers.
pub trait Regressor {
    /// Predicts a micro fixed-point target for one feature vector.
    fn predict(&self, features: &FeatureVector) -> i64;

    /// Per-feature importances, normalized to sum to [`SCALE`]
    /// (all zeros when the model made no splits).
    fn feature_importances(&self) -> &[i64];
}

/// One tree node. A node with `value = Some(..)` is a leaf; otherwise it is
/// an internal split on `feature_index` at `threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub feature_index: u16,
    pub threshold: i64,
    pub left: u16,
    pub right: u16,
    pub value: Option<i64>,
}

impl Node {
    pub fn internal(feature_index: u16, threshold: i64, left: u16, right: u16) -> Self {
        Self {
            feature_index,
            threshold,
            left,
            right,
            value: None,
        }
    }

    pub fn leaf(value: i64) -> Self {
        Self {
            feature_index: 0,
            threshold: 0,
            left: 0,
            right: 0,
            value: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }
}

/// A single regression tree as a flat node array rooted at index 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walks the tree for one feature vector. Feature values `<= threshold`
    /// descend left. Out-of-range indices terminate the walk at 0, matching
    /// the evaluator's never-panic contract; `validate` rejects such trees
    /// before they are ever installed.
    pub fn evaluate(&self, features: &[i64]) -> i64 {
        let mut idx = 0usize;
        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0;
            };
            if let Some(value) = node.value {
                return value;
            }
            let feature = match features.get(node.feature_index as usize) {
                Some(f) => *f,
                None => return 0,
            };
            idx = if feature <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    /// Structural checks: non-empty, child indices in range and strictly
    /// forward (so walks terminate), feature indices within the vector width.
    pub fn validate(&self, feature_count: u16) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        if self.nodes.len() > u16::MAX as usize {
            return Err(format!("tree has too many nodes: {}", self.nodes.len()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                continue;
            }
            if node.feature_index >= feature_count {
                return Err(format!(
                    "node {i} references feature {} of {feature_count}",
                    node.feature_index
                ));
            }
            let (left, right) = (node.left as usize, node.right as usize);
            if left >= self.nodes.len() || right >= self.nodes.len() {
                return Err(format!("node {i} has out-of-range child"));
            }
            if left <= i || right <= i {
                return Err(format!("node {i} has non-forward child"));
            }
        }
        Ok(())
    }
}

/// A trained random forest: an ensemble of regression trees whose outputs
/// are averaged, plus the normalized per-feature importances accumulated
/// during training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestModel {
    pub version: u32,
    pub feature_count: u16,
    pub trees: Vec<Tree>,
    pub importances: Vec<i64>,
}

/// Current serialized model format version.
pub const MODEL_VERSION: u32 = 1;

impl ForestModel {
    pub fn new(feature_count: u16, trees: Vec<Tree>, importances: Vec<i64>) -> Self {
        Self {
            version: MODEL_VERSION,
            feature_count,
            trees,
            importances,
        }
    }

    /// Validates the whole ensemble. Run after training and after loading
    /// an artifact, before the model is installed for inference.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.version != MODEL_VERSION {
            return Err(CoreError::InvalidModel(format!(
                "unsupported model version {}",
                self.version
            )));
        }
        if self.trees.is_empty() {
            return Err(CoreError::InvalidModel("forest has no trees".to_string()));
        }
        if self.importances.len() != self.feature_count as usize {
            return Err(CoreError::InvalidModel(format!(
                "importance width {} does not match feature count {}",
                self.importances.len(),
                self.feature_count
            )));
        }
        let total: i64 = self.importances.iter().sum();
        if total != 0 && total != SCALE {
            return Err(CoreError::InvalidModel(format!(
                "importances sum to {total}, expected 0 or {SCALE}"
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count)
                .map_err(|e| CoreError::InvalidModel(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }

    /// Mean feature importance scaled to [0, 100].
    ///
    /// With importances normalized to [`SCALE`], this is a constant
    /// `100 / feature_count` for any model that made at least one split and
    /// 0 for a model of pure-leaf trees. A per-model scalar, not a
    /// per-request uncertainty estimate.
    pub fn confidence(&self) -> f64 {
        if self.importances.is_empty() {
            return 0.0;
        }
        let total: i64 = self.importances.iter().sum();
        let mean = total as f64 / self.importances.len() as f64;
        mean / SCALE as f64 * 100.0
    }
}

impl Regressor for ForestModel {
    /// Integer mean of the per-tree outputs. The i128 accumulator keeps the
    /// sum exact for any realistic ensemble size.
    fn predict(&self, features: &FeatureVector) -> i64 {
        if self.trees.is_empty() {
            return 0;
        }
        let sum: i128 = self
            .trees
            .iter()
            .map(|tree| tree.evaluate(features) as i128)
            .sum();
        (sum / self.trees.len() as i128) as i64
    }

    fn feature_importances(&self) -> &[i64] {
        &self.importances
    }
}
