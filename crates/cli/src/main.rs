//! AgriCast command line interface
//!
//! Loads the historical dataset and trained artifacts, then answers
//! prediction and analysis queries from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use agricast_core::artifacts::ArtifactBundle;
use agricast_core::dataset::HistoryTable;
use agricast_core::predictor::{AnalysisOutcome, Predictor};
use agricast_core::report::render_prediction_report;

#[derive(Parser)]
#[command(name = "agricast")]
#[command(about = "Crop-yield prediction and historical analysis", long_about = None)]
#[command(version)]
struct Cli {
    /// Historical crop-yield dataset (CSV)
    #[arg(long, default_value = "data/historical_crop_yield.csv")]
    dataset: PathBuf,

    /// Directory holding the trained model and encoder artifacts
    #[arg(long, default_value = "artifacts")]
    artifacts: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the yield category for a target season
    Predict {
        /// District name, exactly as it appears in the dataset
        #[arg(long)]
        district: String,

        /// Crop name, exactly as it appears in the dataset
        #[arg(long)]
        crop: String,

        /// Target year
        #[arg(long)]
        year: i32,

        /// Soil pH level
        #[arg(long)]
        ph: f64,

        /// Write a plain-text report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Narrate the recorded outcome for a past season
    Analyze {
        /// District name
        #[arg(long)]
        district: String,

        /// Crop name
        #[arg(long)]
        crop: String,

        /// Recorded year to look up
        #[arg(long)]
        year: i32,
    },
    /// List the districts, crops, and years available in the dataset
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let history = HistoryTable::from_csv(&cli.dataset)
        .with_context(|| format!("Failed to load dataset from {}", cli.dataset.display()))?;

    match cli.command {
        Commands::Predict {
            district,
            crop,
            year,
            ph,
            report,
        } => {
            let bundle = load_bundle(&cli.artifacts)?;
            let predictor = Predictor::new(history, bundle.encoders, bundle.model);

            let prediction = predictor
                .predict(&district, &crop, year, ph)
                .context("Prediction failed")?;

            println!(
                "Auto-filled data (10-year average for {district}):"
            );
            println!("  Rainfall:    {} mm", prediction.normals.rainfall_mm);
            println!("  Temperature: {} °C", prediction.normals.temperature_c);
            println!("  Fertilizer:  {} kg/ha", prediction.normals.fertilizer_kg_ha);
            println!();
            println!(
                "{} in {} ({}): {} (estimated {} kg/acre)",
                prediction.crop,
                prediction.district,
                prediction.year,
                prediction.category,
                prediction.estimated_yield_kg_acre
            );
            println!("Reason: {}", prediction.reason);

            if let Some(path) = report {
                std::fs::write(&path, render_prediction_report(&prediction))
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                println!("Report written to {}", path.display());
            }
        }
        Commands::Analyze {
            district,
            crop,
            year,
        } => {
            let bundle = load_bundle(&cli.artifacts)?;
            let predictor = Predictor::new(history, bundle.encoders, bundle.model);

            let analysis = predictor.analyze(&district, &crop, year);

            if let Some(snapshot) = &analysis.snapshot {
                println!("Recorded district data for {year}:");
                println!("  Rainfall:    {} mm", snapshot.rainfall_mm);
                println!("  Temperature: {} °C", snapshot.temperature_c);
                println!("  Fertilizer:  {} kg/ha", snapshot.fertilizer_kg_ha);
                println!();
            }

            match analysis.outcome {
                AnalysisOutcome::Record { narrative, .. } => println!("{narrative}"),
                AnalysisOutcome::NoData => println!(
                    "No data available for {crop} in {district} for the year {year}."
                ),
            }
        }
        Commands::List => {
            println!("Districts:");
            for district in history.districts() {
                println!("  {district}");
            }
            println!("Crops:");
            for crop in history.crops() {
                println!("  {crop}");
            }
            let years = history.years();
            if let (Some(first), Some(last)) = (years.first(), years.last()) {
                println!("Years: {first}..{last} ({} recorded)", years.len());
            }
        }
    }

    Ok(())
}

fn load_bundle(dir: &std::path::Path) -> Result<ArtifactBundle> {
    ArtifactBundle::load(dir).with_context(|| {
        format!(
            "Failed to load artifacts from {} (run agricast-train first)",
            dir.display()
        )
    })
}
