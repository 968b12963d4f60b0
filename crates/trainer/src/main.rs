//! AgriCast trainer CLI
//!
//! Deterministic offline trainer for the crop-yield classifier.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use agricast_core::artifacts::ArtifactBundle;
use agricast_core::dataset::HistoryTable;
use agricast_core::encoders::EncoderSet;
use agricast_core::features::FEATURE_ORDER;
use agricast_trainer::{evaluate_accuracy, ForestConfig, ForestTrainer, TrainingSet};

#[derive(Parser, Debug)]
#[command(name = "agricast-train")]
#[command(author = "AgriCast Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic random-forest trainer for crop-yield prediction", long_about = None)]
struct Args {
    /// Historical crop-yield dataset (CSV)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for model and encoder artifacts
    #[arg(short, long, default_value = "artifacts")]
    output: PathBuf,

    /// Number of trees in the forest
    #[arg(long, default_value = "100")]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "12")]
    max_depth: usize,

    /// Minimum samples per leaf
    #[arg(long, default_value = "1")]
    min_samples_leaf: usize,

    /// Candidate features per split (0 = floor(sqrt(feature_count)))
    #[arg(long, default_value = "0")]
    features_per_split: usize,

    /// Random seed for shuffling, bootstrap, and feature subsampling
    #[arg(long, default_value = "42")]
    seed: i64,

    /// Holdout percentage for accuracy evaluation (0 disables)
    #[arg(long, default_value = "20")]
    holdout: u32,

    /// Skip dataset shuffling
    #[arg(long)]
    no_shuffle: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("AgriCast trainer v{}", env!("CARGO_PKG_VERSION"));

    // Load dataset
    info!("Loading dataset from: {}", args.input.display());
    let history = HistoryTable::from_csv(&args.input).context("Failed to load dataset")?;

    let csv_bytes = std::fs::read(&args.input).context("Failed to re-read dataset for hashing")?;
    let training_data_hash = hex::encode(blake3::hash(&csv_bytes).as_bytes());
    info!("Training data hash: {training_data_hash}");

    // Fit encoders over the full table, before any split
    let encoders = EncoderSet::fit(&history);
    info!(
        "Encoders fitted: {} districts, {} crops, {} categories",
        encoders.district.len(),
        encoders.crop.len(),
        encoders.category.len()
    );

    let mut set = TrainingSet::from_history(&history, &encoders)?;
    info!("Design matrix: {} rows", set.len());

    if !args.no_shuffle {
        info!("Shuffling with seed: {}", args.seed);
        set.shuffle(args.seed);
    }

    let stats = set.feature_stats();
    info!("Feature statistics:");
    for (name, (min, max)) in FEATURE_ORDER.iter().zip(&stats) {
        info!("  {name}: min={min}, max={max}");
    }

    let (train, test) = set.split(args.holdout);
    info!(
        "Split: {} training rows, {} holdout rows",
        train.len(),
        test.len()
    );

    let config = ForestConfig {
        num_trees: args.trees,
        max_depth: args.max_depth,
        min_samples_leaf: args.min_samples_leaf,
        features_per_split: args.features_per_split,
        bootstrap: true,
        seed: args.seed,
    };

    info!("Training configuration:");
    info!("  Trees: {}", config.num_trees);
    info!("  Max depth: {}", config.max_depth);
    info!("  Min samples per leaf: {}", config.min_samples_leaf);
    info!("  Features per split: {} (0 = auto)", config.features_per_split);
    info!("  Seed: {}", config.seed);

    info!("Starting training...");
    let trainer = ForestTrainer::new(config);
    let model = trainer.train(&train, encoders.category.len(), training_data_hash)?;

    info!("Training complete!");
    info!("  Trees: {}", model.num_trees());
    info!("  Model hash: {}", model.metadata.model_hash);

    if !test.is_empty() {
        let accuracy = evaluate_accuracy(&model, &test)?;
        info!("Holdout accuracy: {:.1}%", accuracy * 100.0);
    } else {
        info!("Holdout disabled or too small, skipping evaluation");
    }

    let bundle = ArtifactBundle::new(model, encoders);
    bundle
        .save(&args.output)
        .context("Failed to write artifacts")?;

    info!("✓ Artifacts written to {}", args.output.display());

    Ok(())
}
