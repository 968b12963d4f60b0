//! Random-forest trainer
//!
//! Fits an ensemble of Gini CART trees over the design matrix with
//! seeded bootstrap sampling and per-split feature subsampling. Every
//! source of randomness is an [`LcgRng`] derived from the configured
//! seed, so the same matrix and configuration reproduce the same forest.

use tracing::{debug, info};

use agricast_core::features::FEATURE_COUNT;
use agricast_core::forest::{structural_hash, Model, ModelMetadata, Tree};

use crate::cart::{CartBuilder, TreeConfig};
use crate::deterministic::LcgRng;
use crate::errors::TrainerError;
use crate::matrix::TrainingSet;

/// Offset between per-tree RNG streams
const TREE_SEED_STRIDE: i64 = 1_000_003;

/// Forest training configuration
#[derive(Clone, Debug)]
pub struct ForestConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Candidate features per split; 0 selects floor(sqrt(feature_count))
    pub features_per_split: usize,
    /// Draw bootstrap samples per tree instead of the full matrix
    pub bootstrap: bool,
    pub seed: i64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: 12,
            min_samples_leaf: 1,
            features_per_split: 0,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random-forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    /// Train a forest over the matrix.
    ///
    /// `class_count` comes from the fitted category encoder;
    /// `training_data_hash` is provenance recorded into the metadata.
    pub fn train(
        &self,
        set: &TrainingSet,
        class_count: usize,
        training_data_hash: String,
    ) -> Result<Model, TrainerError> {
        if set.is_empty() {
            return Err(TrainerError::Training("empty training set".to_string()));
        }
        if class_count == 0 {
            return Err(TrainerError::Training("no target classes".to_string()));
        }
        if self.config.num_trees == 0 {
            return Err(TrainerError::Training(
                "num_trees must be positive".to_string(),
            ));
        }

        let n = set.len();
        let features_per_split = if self.config.features_per_split == 0 {
            isqrt(FEATURE_COUNT).max(1)
        } else {
            self.config.features_per_split
        };

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_leaf: self.config.min_samples_leaf,
            features_per_split,
        };
        let builder = CartBuilder::new(&set.features, &set.targets, class_count, tree_config);

        let mut trees = Vec::with_capacity(self.config.num_trees);
        for tree_idx in 0..self.config.num_trees {
            let mut rng = LcgRng::new(
                self.config
                    .seed
                    .wrapping_add(tree_idx as i64 * TREE_SEED_STRIDE),
            );

            let indices: Vec<usize> = if self.config.bootstrap {
                (0..n).map(|_| rng.next_range(n as i64) as usize).collect()
            } else {
                (0..n).collect()
            };

            let tree = builder.build(&indices, &mut rng);
            debug!(
                tree = tree_idx + 1,
                nodes = tree.nodes.len(),
                depth = tree.depth(),
                "trained tree"
            );
            trees.push(tree);
        }

        let max_depth = trees.iter().map(Tree::depth).max().unwrap_or(0);
        let model_hash = structural_hash(&trees, FEATURE_COUNT, class_count)?;

        let metadata = ModelMetadata {
            created_at: chrono::Utc::now().timestamp(),
            tree_count: trees.len(),
            max_depth,
            model_hash,
            training_data_hash,
        };

        let model = Model::new(trees, FEATURE_COUNT, class_count, metadata);
        model.validate()?;

        info!(
            trees = model.num_trees(),
            max_depth,
            hash = %model.metadata.model_hash,
            "training complete"
        );

        Ok(model)
    }
}

/// Fraction of holdout rows the model classifies correctly
pub fn evaluate_accuracy(model: &Model, set: &TrainingSet) -> Result<f64, TrainerError> {
    if set.is_empty() {
        return Err(TrainerError::Training("empty evaluation set".to_string()));
    }

    let mut correct = 0usize;
    for (row, &target) in set.features.iter().zip(&set.targets) {
        if model.predict(row)? == target {
            correct += 1;
        }
    }
    Ok(correct as f64 / set.len() as f64)
}

/// Integer square root, rounded down
fn isqrt(n: usize) -> usize {
    let mut k = 0usize;
    while (k + 1) * (k + 1) <= n {
        k += 1;
    }
    k
}
