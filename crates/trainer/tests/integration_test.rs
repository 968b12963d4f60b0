//! Integration tests for the deterministic forest trainer
//!
//! Ensures identical artifacts come out of identical inputs and that the
//! trained bundle drives the predictor end to end.

use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

use agricast_core::artifacts::ArtifactBundle;
use agricast_core::dataset::HistoryTable;
use agricast_core::encoders::EncoderSet;
use agricast_core::predictor::Predictor;
use agricast_trainer::{evaluate_accuracy, ForestConfig, ForestTrainer, TrainingSet};

/// Synthetic dataset with a clean rainfall/temperature signal: wet mild
/// seasons are Good, dry hot seasons are Bad, the rest Average.
fn synthetic_csv() -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;

    writeln!(
        file,
        "District,Crop,Year,Rainfall (mm),Temperature (°C),Fertilizer Used (kg/ha),pH Level,Previous Year Yield (ton/ha),Yield Category"
    )?;

    let districts = ["Thanjavur", "Madurai", "Salem"];
    let crops = ["Rice", "Maize"];

    for (d, district) in districts.iter().enumerate() {
        for (c, crop) in crops.iter().enumerate() {
            for step in 0..6 {
                let year = 2015 + step;
                let (rainfall, temperature, category, prior) = match step % 3 {
                    0 => (1200.0 + d as f64 * 10.0, 30.0, "Good", 4.5),
                    1 => (600.0 + c as f64 * 10.0, 37.0, "Bad", 1.8),
                    _ => (950.0, 33.0, "Average", 3.0),
                };
                writeln!(
                    file,
                    "{district},{crop},{year},{rainfall},{temperature},{fert},{ph},{prior},{category}",
                    fert = 90.0 + step as f64,
                    ph = 6.0 + step as f64 / 10.0,
                )?;
            }
        }
    }

    file.flush()?;
    Ok(file)
}

fn small_config() -> ForestConfig {
    ForestConfig {
        num_trees: 12,
        max_depth: 8,
        ..ForestConfig::default()
    }
}

#[test]
fn training_is_deterministic_across_runs() -> Result<()> {
    let file = synthetic_csv()?;
    let history = HistoryTable::from_csv(file.path())?;
    let encoders = EncoderSet::fit(&history);
    let set = TrainingSet::from_history(&history, &encoders)?;

    let model1 = ForestTrainer::new(small_config()).train(&set, 3, String::new())?;
    let model2 = ForestTrainer::new(small_config()).train(&set, 3, String::new())?;

    assert_eq!(model1.trees, model2.trees, "trees should be identical");
    assert_eq!(
        model1.metadata.model_hash, model2.metadata.model_hash,
        "model hashes should be identical"
    );
    assert_eq!(
        model1.structural_hash_hex()?,
        model2.structural_hash_hex()?
    );

    Ok(())
}

#[test]
fn shuffle_and_split_are_deterministic() -> Result<()> {
    let file = synthetic_csv()?;
    let history = HistoryTable::from_csv(file.path())?;
    let encoders = EncoderSet::fit(&history);

    let mut set1 = TrainingSet::from_history(&history, &encoders)?;
    let mut set2 = set1.clone();

    set1.shuffle(42);
    set2.shuffle(42);
    assert_eq!(set1.features, set2.features);
    assert_eq!(set1.targets, set2.targets);

    let (train1, test1) = set1.split(20);
    let (train2, test2) = set2.split(20);
    assert_eq!(train1.features, train2.features);
    assert_eq!(test1.features, test2.features);
    assert_eq!(test1.targets, test2.targets);

    Ok(())
}

#[test]
fn different_seeds_change_the_shuffle() -> Result<()> {
    let file = synthetic_csv()?;
    let history = HistoryTable::from_csv(file.path())?;
    let encoders = EncoderSet::fit(&history);

    let mut set1 = TrainingSet::from_history(&history, &encoders)?;
    let mut set2 = set1.clone();

    set1.shuffle(42);
    set2.shuffle(43);
    assert_ne!(set1.features, set2.features);

    Ok(())
}

#[test]
fn holdout_accuracy_is_a_fraction() -> Result<()> {
    let file = synthetic_csv()?;
    let history = HistoryTable::from_csv(file.path())?;
    let encoders = EncoderSet::fit(&history);

    let mut set = TrainingSet::from_history(&history, &encoders)?;
    set.shuffle(42);
    let (train, test) = set.split(20);

    let model = ForestTrainer::new(small_config()).train(&train, 3, String::new())?;
    let accuracy = evaluate_accuracy(&model, &test)?;

    assert!((0.0..=1.0).contains(&accuracy));
    Ok(())
}

#[test]
fn trained_bundle_round_trips_and_predicts() -> Result<()> {
    let file = synthetic_csv()?;
    let history = HistoryTable::from_csv(file.path())?;
    let encoders = EncoderSet::fit(&history);
    let set = TrainingSet::from_history(&history, &encoders)?;

    let model = ForestTrainer::new(small_config()).train(
        &set,
        encoders.category.len(),
        "feed".to_string(),
    )?;

    let dir = tempfile::tempdir()?;
    ArtifactBundle::new(model, encoders).save(dir.path())?;
    let bundle = ArtifactBundle::load(dir.path())?;

    let predictor = Predictor::new(history, bundle.encoders, bundle.model);
    let prediction = predictor.predict("Thanjavur", "Rice", 2026, 6.5)?;

    assert!(["Good", "Average", "Bad"].contains(&prediction.category.as_str()));
    assert!(prediction.estimated_yield_kg_acre >= 0.0);
    assert!(!prediction.reason.is_empty());

    // Deterministic end to end.
    let again = predictor.predict("Thanjavur", "Rice", 2026, 6.5)?;
    assert_eq!(prediction, again);

    Ok(())
}

#[test]
fn unknown_district_fails_prediction() -> Result<()> {
    let file = synthetic_csv()?;
    let history = HistoryTable::from_csv(file.path())?;
    let bundle = {
        let encoders = EncoderSet::fit(&history);
        let set = TrainingSet::from_history(&history, &encoders)?;
        let model =
            ForestTrainer::new(small_config()).train(&set, encoders.category.len(), String::new())?;
        ArtifactBundle::new(model, encoders)
    };

    let predictor = Predictor::new(history, bundle.encoders, bundle.model);
    let err = predictor.predict("Coimbatore", "Rice", 2026, 6.5).unwrap_err();
    assert!(err.to_string().contains("Coimbatore"));

    Ok(())
}
