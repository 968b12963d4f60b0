//! Design-matrix construction and deterministic splitting
//!
//! Turns the historical table into the fixed-order numeric matrix the
//! forest trains on, with hash-ordered shuffling and an integer holdout
//! split so every run over the same inputs sees the same partitions.

use agricast_core::dataset::HistoryTable;
use agricast_core::encoders::EncoderSet;
use agricast_core::features::{assemble_features, ClimateNormals, FEATURE_COUNT};

use crate::deterministic::row_hash;
use crate::errors::TrainerError;

/// Numeric training matrix in the shared feature order
#[derive(Clone, Debug, Default)]
pub struct TrainingSet {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<usize>,
}

impl TrainingSet {
    /// Build the matrix from historical records and fitted encoders.
    ///
    /// The encoders were fitted over this same table, so `transform` can
    /// only fail if callers pass mismatched inputs; the error propagates
    /// rather than being assumed away.
    pub fn from_history(
        history: &HistoryTable,
        encoders: &EncoderSet,
    ) -> Result<Self, TrainerError> {
        let mut features = Vec::with_capacity(history.len());
        let mut targets = Vec::with_capacity(history.len());

        for record in history.records() {
            let district_code = encoders.district.transform(&record.district)?;
            let crop_code = encoders.crop.transform(&record.crop)?;
            let target = encoders.category.transform(&record.category)?;

            let normals = ClimateNormals {
                rainfall_mm: record.rainfall_mm,
                temperature_c: record.temperature_c,
                fertilizer_kg_ha: record.fertilizer_kg_ha,
            };
            features.push(assemble_features(
                district_code,
                crop_code,
                record.ph,
                record.year,
                &normals,
            ));
            targets.push(target);
        }

        if features.is_empty() {
            return Err(TrainerError::Dataset("no training rows".to_string()));
        }

        Ok(Self { features, targets })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Deterministically shuffle rows by hash ordering under `seed`.
    ///
    /// The sort is stable, so rows hashing equal keep their input order
    /// and the permutation is identical on every run.
    pub fn shuffle(&mut self, seed: i64) {
        let n = self.features.len();
        let mut order: Vec<(i64, usize)> = (0..n)
            .map(|i| (row_hash(&self.features[i], seed), i))
            .collect();
        order.sort_by_key(|(hash, _)| *hash);

        let mut features = Vec::with_capacity(n);
        let mut targets = Vec::with_capacity(n);
        for (_, idx) in order {
            features.push(self.features[idx].clone());
            targets.push(self.targets[idx]);
        }

        self.features = features;
        self.targets = targets;
    }

    /// Split off the last `holdout_percent` of rows as a test set.
    ///
    /// Integer arithmetic only: `n * holdout_percent / 100` rows, which
    /// can be zero for tiny datasets — callers skip evaluation then.
    pub fn split(self, holdout_percent: u32) -> (TrainingSet, TrainingSet) {
        let n = self.features.len();
        let holdout = n * holdout_percent as usize / 100;
        let cut = n - holdout;

        let mut features = self.features;
        let mut targets = self.targets;
        let test_features = features.split_off(cut);
        let test_targets = targets.split_off(cut);

        (
            TrainingSet { features, targets },
            TrainingSet {
                features: test_features,
                targets: test_targets,
            },
        )
    }

    /// Per-feature (min, max) for sanity logging
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY); FEATURE_COUNT];
        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }
        stats
    }
}
