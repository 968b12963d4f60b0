//! AgriCast trainer - deterministic offline random-forest training
//!
//! Fits the crop-yield classifier and its encoders from the historical
//! CSV with full reproducibility: same dataset and seed, same artifacts.

pub mod cart;
pub mod deterministic;
pub mod errors;
pub mod matrix;
pub mod trainer;

use agricast_core::artifacts::ArtifactBundle;
use agricast_core::dataset::HistoryTable;
use agricast_core::encoders::EncoderSet;

pub use cart::{CartBuilder, TreeConfig};
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use errors::TrainerError;
pub use matrix::TrainingSet;
pub use trainer::{evaluate_accuracy, ForestConfig, ForestTrainer};

/// Fit encoders and a forest over a full historical table, returning the
/// ready-to-persist bundle. Used when no holdout evaluation is wanted.
pub fn train_bundle(
    history: &HistoryTable,
    config: ForestConfig,
    training_data_hash: String,
) -> Result<ArtifactBundle, TrainerError> {
    let encoders = EncoderSet::fit(history);
    let set = TrainingSet::from_history(history, &encoders)?;

    let trainer = ForestTrainer::new(config);
    let model = trainer.train(&set, encoders.category.len(), training_data_hash)?;

    Ok(ArtifactBundle::new(model, encoders))
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
