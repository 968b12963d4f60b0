//! CART (Classification and Regression Tree) builder
//!
//! Deterministic exact-greedy construction of classification trees with
//! Gini impurity. Tie-breaking on equal gains is explicit, so the same
//! samples, feature subset, and configuration always yield the same tree.

use agricast_core::forest::{Node, Tree};

use crate::deterministic::{LcgRng, SplitTieBreaker};

/// Parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Candidate features drawn per split; 0 means all features
    pub features_per_split: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            min_samples_leaf: 1,
            features_per_split: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, threshold: f64, gain: f64, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            gain,
            tie_breaker: SplitTieBreaker::new(feature_idx, threshold, node_id),
        }
    }
}

/// Build a classification tree with exact-greedy Gini splits
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [usize],
    feature_count: usize,
    class_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<f64>],
        targets: &'a [usize],
        class_count: usize,
        config: TreeConfig,
    ) -> Self {
        assert_eq!(features.len(), targets.len());
        let feature_count = features.first().map_or(0, Vec::len);

        Self {
            config,
            features,
            targets,
            feature_count,
            class_count,
        }
    }

    /// Build a tree over the given sample indices (bootstrap rows may
    /// repeat). `rng` drives per-split feature subsampling only.
    pub fn build(&self, indices: &[usize], rng: &mut LcgRng) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(indices, 0, &mut nodes, 0, rng);
        Tree { nodes }
    }

    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        node_id: usize,
        rng: &mut LcgRng,
    ) -> i32 {
        let current_idx = nodes.len() as i32;
        let majority = self.majority_class(indices);

        // Stopping conditions: depth, size, purity.
        if depth >= self.config.max_depth
            || indices.len() < 2 * self.config.min_samples_leaf
            || self.is_pure(indices)
        {
            nodes.push(Node::leaf(current_idx, majority));
            return current_idx;
        }

        let split = match self.find_best_split(indices, node_id, rng) {
            Some(s) => s,
            None => {
                nodes.push(Node::leaf(current_idx, majority));
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        if left_indices.len() < self.config.min_samples_leaf
            || right_indices.len() < self.config.min_samples_leaf
        {
            nodes.push(Node::leaf(current_idx, majority));
            return current_idx;
        }

        // Reserve the current node, then fill child links.
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            0,
            0,
        ));

        let left = self.build_node(&left_indices, depth + 1, nodes, node_id * 2 + 1, rng);
        let right = self.build_node(&right_indices, depth + 1, nodes, node_id * 2 + 2, rng);

        let slot = current_idx as usize;
        nodes[slot].left = left;
        nodes[slot].right = right;

        current_idx
    }

    /// Most frequent class among the samples; ties go to the lowest index
    fn majority_class(&self, indices: &[usize]) -> usize {
        let counts = self.class_counts(indices);
        counts
            .iter()
            .enumerate()
            .max_by(|(ia, ca), (ib, cb)| ca.cmp(cb).then(ib.cmp(ia)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.class_count];
        for &idx in indices {
            counts[self.targets[idx]] += 1;
        }
        counts
    }

    fn is_pure(&self, indices: &[usize]) -> bool {
        let counts = self.class_counts(indices);
        counts.iter().filter(|&&c| c > 0).count() <= 1
    }

    fn find_best_split(
        &self,
        indices: &[usize],
        node_id: usize,
        rng: &mut LcgRng,
    ) -> Option<SplitCandidate> {
        let parent_impurity = self.gini(indices);
        let candidate_features = self.candidate_features(rng);

        let mut best: Option<SplitCandidate> = None;

        for feature_idx in candidate_features {
            for threshold in self.candidate_thresholds(indices, feature_idx) {
                let (left, right) = self.split_samples(indices, feature_idx, threshold);
                if left.len() < self.config.min_samples_leaf
                    || right.len() < self.config.min_samples_leaf
                {
                    continue;
                }

                let n = indices.len() as f64;
                let weighted = (left.len() as f64 / n) * self.gini(&left)
                    + (right.len() as f64 / n) * self.gini(&right);
                let gain = parent_impurity - weighted;
                if gain <= 0.0 {
                    continue;
                }

                let candidate = SplitCandidate::new(feature_idx, threshold, gain, node_id);
                best = match best {
                    None => Some(candidate),
                    Some(current) => {
                        match candidate.gain.total_cmp(&current.gain) {
                            std::cmp::Ordering::Greater => Some(candidate),
                            std::cmp::Ordering::Equal
                                if candidate.tie_breaker < current.tie_breaker =>
                            {
                                Some(candidate)
                            }
                            _ => Some(current),
                        }
                    }
                };
            }
        }

        best
    }

    /// Feature subset for this split, ascending for deterministic iteration
    fn candidate_features(&self, rng: &mut LcgRng) -> Vec<usize> {
        if self.config.features_per_split == 0 || self.config.features_per_split >= self.feature_count
        {
            (0..self.feature_count).collect()
        } else {
            rng.sample_indices(self.feature_count, self.config.features_per_split)
        }
    }

    /// Sorted distinct values of the feature, minus the largest (a split
    /// at the maximum sends every sample left)
    fn candidate_thresholds(&self, indices: &[usize], feature_idx: usize) -> Vec<f64> {
        let mut values: Vec<f64> = indices
            .iter()
            .map(|&idx| self.features[idx][feature_idx])
            .collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        values.pop();
        values
    }

    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut left = Vec::new();
        let mut right = Vec::new();

        for &idx in indices {
            if self.features[idx][feature_idx] <= threshold {
                left.push(idx);
            } else {
                right.push(idx);
            }
        }

        (left, right)
    }

    /// Gini impurity: `1 - sum(p_c^2)`
    fn gini(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let counts = self.class_counts(indices);
        let n = indices.len() as f64;
        1.0 - counts
            .iter()
            .map(|&c| {
                let p = c as f64 / n;
                p * p
            })
            .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        // Class 1 when feature 0 is large, class 0 otherwise.
        let features = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![8.0, 10.0],
            vec![9.0, 20.0],
            vec![10.0, 30.0],
        ];
        let targets = vec![0, 0, 0, 1, 1, 1];
        (features, targets)
    }

    fn all_indices(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn separable_data_splits_cleanly() {
        let (features, targets) = separable();
        let builder = CartBuilder::new(&features, &targets, 2, TreeConfig::default());
        let mut rng = LcgRng::new(42);
        let tree = builder.build(&all_indices(6), &mut rng);

        assert!(tree.validate(2, 2).is_ok());
        for (row, &target) in features.iter().zip(&targets) {
            assert_eq!(tree.evaluate(row), Some(target));
        }
    }

    #[test]
    fn pure_node_becomes_leaf_immediately() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let targets = vec![1, 1, 1];
        let builder = CartBuilder::new(&features, &targets, 2, TreeConfig::default());
        let mut rng = LcgRng::new(42);
        let tree = builder.build(&all_indices(3), &mut rng);

        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].leaf, Some(1));
    }

    #[test]
    fn max_depth_limits_tree() {
        let (features, targets) = separable();
        let config = TreeConfig {
            max_depth: 0,
            ..TreeConfig::default()
        };
        let builder = CartBuilder::new(&features, &targets, 2, config);
        let mut rng = LcgRng::new(42);
        let tree = builder.build(&all_indices(6), &mut rng);

        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].is_leaf());
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let (features, targets) = separable();
        let config = TreeConfig {
            min_samples_leaf: 4,
            ..TreeConfig::default()
        };
        let builder = CartBuilder::new(&features, &targets, 2, config);
        let mut rng = LcgRng::new(42);
        let tree = builder.build(&all_indices(6), &mut rng);

        // 6 samples cannot split into two sides of >= 4 each.
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn building_is_deterministic() {
        let (features, targets) = separable();
        let builder = CartBuilder::new(&features, &targets, 2, TreeConfig::default());

        let mut rng1 = LcgRng::new(42);
        let mut rng2 = LcgRng::new(42);
        let a = builder.build(&all_indices(6), &mut rng1);
        let b = builder.build(&all_indices(6), &mut rng2);

        assert_eq!(a, b);
    }

    #[test]
    fn bootstrap_duplicates_are_handled() {
        let (features, targets) = separable();
        let builder = CartBuilder::new(&features, &targets, 2, TreeConfig::default());
        let mut rng = LcgRng::new(42);
        let tree = builder.build(&[0, 0, 0, 5, 5, 5], &mut rng);

        assert!(tree.validate(2, 2).is_ok());
        assert_eq!(tree.evaluate(&features[0]), Some(0));
        assert_eq!(tree.evaluate(&features[5]), Some(1));
    }
}
