//! Deterministic utilities for reproducible training
//!
//! Provides LCG-based pseudo-randomness and tie-breaking logic so that
//! identical inputs train identical forests across platforms and runs.

use std::num::Wrapping;

/// Linear Congruential Generator for deterministic pseudo-randomness.
/// Uses constants from Numerical Recipes (glibc).
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<i64>,
}

impl LcgRng {
    const MULTIPLIER: i64 = 1103515245;
    const INCREMENT: i64 = 12345;
    const MODULUS: i64 = 1 << 31;

    pub fn new(seed: i64) -> Self {
        Self {
            state: Wrapping(seed.abs() % Self::MODULUS),
        }
    }

    /// Derives an independent per-tree stream from a base seed, so each
    /// tree's bootstrap sample is fixed by (seed, tree index) alone.
    pub fn for_tree(seed: i64, tree_index: usize) -> Self {
        Self::new(seed.wrapping_add((tree_index as i64).wrapping_mul(1_000_003)))
    }

    /// Next value in range [0, MODULUS).
    pub fn next_i64(&mut self) -> i64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 & (Self::MODULUS - 1)).abs()
    }

    /// Next value in range [0, max).
    pub fn next_range(&mut self, max: i64) -> i64 {
        if max <= 0 {
            return 0;
        }
        self.next_i64() % max
    }

    /// Draws `count` indices in [0, len) with replacement.
    pub fn bootstrap_indices(&mut self, len: usize, count: usize) -> Vec<usize> {
        (0..count)
            .map(|_| self.next_range(len as i64) as usize)
            .collect()
    }
}

/// Deterministic tie-breaker for split selection.
/// Orders candidates by (feature_idx, threshold, node_id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub threshold: i64,
    pub node_id: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold: i64, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            node_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_determinism() {
        let mut rng1 = LcgRng::new(42);
        let mut rng2 = LcgRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_i64(), rng2.next_i64());
        }
    }

    #[test]
    fn test_lcg_range() {
        let mut rng = LcgRng::new(42);
        for _ in 0..100 {
            let val = rng.next_range(10);
            assert!((0..10).contains(&val));
        }
    }

    #[test]
    fn test_tree_streams_differ() {
        let mut a = LcgRng::for_tree(42, 0);
        let mut b = LcgRng::for_tree(42, 1);
        let seq_a: Vec<i64> = (0..8).map(|_| a.next_i64()).collect();
        let seq_b: Vec<i64> = (0..8).map(|_| b.next_i64()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn test_bootstrap_is_reproducible() {
        let mut rng1 = LcgRng::for_tree(42, 7);
        let mut rng2 = LcgRng::for_tree(42, 7);
        assert_eq!(rng1.bootstrap_indices(20, 20), rng2.bootstrap_indices(20, 20));
    }

    #[test]
    fn test_tie_breaker_ordering() {
        let t1 = SplitTieBreaker::new(0, 100, 0);
        let t2 = SplitTieBreaker::new(0, 100, 1);
        let t3 = SplitTieBreaker::new(1, 50, 0);

        assert!(t1 < t2);
        assert!(t1 < t3);
    }
}
