//! AgriCast JSON API gateway
//!
//! Serves prediction and analysis over HTTP for a web front end. All
//! state is loaded once at startup and shared read-only across requests;
//! a missing dataset or artifact is fatal before the listener ever binds.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use agricast_core::artifacts::ArtifactBundle;
use agricast_core::dataset::HistoryTable;
use agricast_core::errors::CoreError;
use agricast_core::predictor::{Analysis, Prediction, Predictor};
use agricast_core::report::render_prediction_report;

#[derive(Parser)]
#[command(name = "agricast-api")]
#[command(about = "AgriCast JSON API gateway")]
#[command(version)]
struct Cli {
    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Historical crop-yield dataset (CSV)
    #[arg(long, default_value = "data/historical_crop_yield.csv")]
    dataset: PathBuf,

    /// Directory holding the trained model and encoder artifacts
    #[arg(long, default_value = "artifacts")]
    artifacts: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let history = HistoryTable::from_csv(&cli.dataset)
        .with_context(|| format!("Failed to load dataset from {}", cli.dataset.display()))?;
    let bundle = ArtifactBundle::load(&cli.artifacts)
        .with_context(|| format!("Failed to load artifacts from {}", cli.artifacts.display()))?;

    let predictor = Predictor::new(history, bundle.encoders, bundle.model);

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/meta", get(meta))
        .route("/api/predict", post(predict))
        .route("/api/analyze", post(analyze))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(predictor));

    let addr = format!("{}:{}", cli.host, cli.port);
    tracing::info!("AgriCast API starting on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

type AppState = Arc<Predictor>;
type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn map_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::UnknownCategory { .. } => api_error(StatusCode::BAD_REQUEST, err.to_string()),
        other => {
            tracing::error!("request failed: {other}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Serialize)]
struct MetaResponse {
    districts: Vec<String>,
    crops: Vec<String>,
    years: Vec<i32>,
}

/// Dropdown values for the form: what the dataset actually contains
async fn meta(State(state): State<AppState>) -> Json<MetaResponse> {
    let history = state.history();
    Json(MetaResponse {
        districts: history.districts(),
        crops: history.crops(),
        years: history.years(),
    })
}

#[derive(Deserialize)]
struct PredictRequest {
    district: String,
    crop: String,
    year: i32,
    ph: f64,
}

#[derive(Serialize)]
struct PredictResponse {
    prediction: Prediction,
    /// Downloadable plain-text report content
    report: String,
}

async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> std::result::Result<Json<PredictResponse>, ApiError> {
    let prediction = state
        .predict(&req.district, &req.crop, req.year, req.ph)
        .map_err(map_core_error)?;

    let report = render_prediction_report(&prediction);
    Ok(Json(PredictResponse { prediction, report }))
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    district: String,
    crop: String,
    year: i32,
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<Analysis> {
    Json(state.analyze(&req.district, &req.crop, req.year))
}
