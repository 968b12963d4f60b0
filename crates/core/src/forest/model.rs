//! Forest model: validation, majority-vote inference, canonical
//! serialization, and blake3 hashing

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::tree::Tree;
use crate::canon::{hash_canonical_hex, to_canonical_json};
use crate::errors::{CoreError, Result};

/// Current model format version
pub const MODEL_VERSION: i32 = 1;

/// Provenance and shape information carried alongside the trees.
///
/// Excluded from the model hash: `created_at` changes every training run
/// and must not change the model's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Unix timestamp (seconds) of the training run
    pub created_at: i64,
    pub tree_count: usize,
    pub max_depth: usize,
    /// Blake3 hex hash of the structural fields
    pub model_hash: String,
    /// Blake3 hex hash of the raw training CSV bytes
    pub training_data_hash: String,
}

/// A trained random-forest classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Model format version (always 1 for now)
    pub version: i32,

    /// Length of the fixed-order feature vector
    pub feature_count: usize,

    /// Number of target classes the forest votes over
    pub class_count: usize,

    /// Trees in the ensemble
    pub trees: Vec<Tree>,

    pub metadata: ModelMetadata,
}

/// Structural view used for hashing; metadata deliberately absent
#[derive(Serialize)]
struct StructuralView<'a> {
    version: i32,
    feature_count: usize,
    class_count: usize,
    trees: &'a [Tree],
}

impl Model {
    pub fn new(
        trees: Vec<Tree>,
        feature_count: usize,
        class_count: usize,
        metadata: ModelMetadata,
    ) -> Self {
        Self {
            version: MODEL_VERSION,
            feature_count,
            class_count,
            trees,
            metadata,
        }
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(CoreError::ValidationFailed(format!(
                "unsupported model version {}",
                self.version
            )));
        }
        if self.feature_count == 0 {
            return Err(CoreError::ValidationFailed(
                "feature_count must be positive".to_string(),
            ));
        }
        if self.class_count == 0 {
            return Err(CoreError::ValidationFailed(
                "class_count must be positive".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(CoreError::ValidationFailed(
                "model has no trees".to_string(),
            ));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count, self.class_count)
                .map_err(|e| CoreError::ValidationFailed(format!("tree {i}: {e}")))?;
        }

        Ok(())
    }

    /// Per-class vote counts over all trees
    pub fn votes(&self, features: &[f64]) -> Result<Vec<usize>> {
        if features.len() != self.feature_count {
            return Err(CoreError::FeatureCountMismatch {
                expected: self.feature_count,
                actual: features.len(),
            });
        }

        let mut counts = vec![0usize; self.class_count];
        for tree in &self.trees {
            if let Some(class) = tree.evaluate(features) {
                if class < self.class_count {
                    counts[class] += 1;
                }
            }
        }
        Ok(counts)
    }

    /// Classify a feature vector by majority vote.
    ///
    /// Ties break to the lowest class index, so inference is fully
    /// deterministic for a fixed model artifact.
    pub fn predict(&self, features: &[f64]) -> Result<usize> {
        let counts = self.votes(features)?;
        let best = counts
            .iter()
            .enumerate()
            .max_by(|(ia, ca), (ib, cb)| ca.cmp(cb).then(ib.cmp(ia)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        Ok(best)
    }

    /// Blake3 hex hash of the structural fields (version, shape, trees)
    pub fn structural_hash_hex(&self) -> Result<String> {
        hash_canonical_hex(&StructuralView {
            version: self.version,
            feature_count: self.feature_count,
            class_count: self.class_count,
            trees: &self.trees,
        })
    }

    /// Serialize to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }

    /// Save as canonical JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Load from JSON and validate
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let model: Model = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Compute the structural hash for freshly trained trees, before the
/// metadata block exists
pub fn structural_hash(trees: &[Tree], feature_count: usize, class_count: usize) -> Result<String> {
    hash_canonical_hex(&StructuralView {
        version: MODEL_VERSION,
        feature_count,
        class_count,
        trees,
    })
}
