//! Proxy-input derivation and feature-vector assembly
//!
//! Rainfall, temperature, and fertilizer for a target season are not
//! forecast: they are historical district averages standing in for values
//! nobody can know ahead of time. The heuristic is exactly the mean over
//! the district's preceding ten years, falling back to a fixed dataset-wide
//! window when the district has no rows there.

use serde::{Deserialize, Serialize};

use crate::dataset::{HistoryTable, YieldRecord};

/// Length of the model's feature vector
pub const FEATURE_COUNT: usize = 7;

/// Fixed feature order shared by training and inference
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "district_code",
    "crop_code",
    "ph",
    "year",
    "rainfall_mm",
    "temperature_c",
    "fertilizer_kg_ha",
];

/// How many years back the primary averaging window reaches
pub const LOOKBACK_YEARS: i32 = 10;

/// Dataset-wide fallback window, `[start, end)`, used when the district
/// has no rows in the primary window
pub const FALLBACK_WINDOW: (i32, i32) = (2014, 2024);

/// Historical-average climate and input values for one district
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateNormals {
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub fertilizer_kg_ha: f64,
}

impl ClimateNormals {
    pub const ZERO: ClimateNormals = ClimateNormals {
        rainfall_mm: 0.0,
        temperature_c: 0.0,
        fertilizer_kg_ha: 0.0,
    };
}

/// Round to two decimals, matching what the narrated output shows
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean climate values over the district's preceding [`LOOKBACK_YEARS`]
/// (`target_year - 10 <= y < target_year`).
///
/// Fallback: if the district has no rows in that window, average the
/// whole dataset over [`FALLBACK_WINDOW`] instead. Zero normals come out
/// only when the fallback window is empty too.
pub fn derive_climate_normals(
    history: &HistoryTable,
    district: &str,
    target_year: i32,
) -> ClimateNormals {
    let primary = history.district_window(district, target_year - LOOKBACK_YEARS, target_year);
    let rows = if primary.is_empty() {
        history.year_window(FALLBACK_WINDOW.0, FALLBACK_WINDOW.1)
    } else {
        primary
    };
    mean_normals(&rows)
}

/// Mean climate values for one exact (district, year), or `None` when the
/// district has no rows that year
pub fn year_snapshot(history: &HistoryTable, district: &str, year: i32) -> Option<ClimateNormals> {
    let rows = history.district_year(district, year);
    if rows.is_empty() {
        None
    } else {
        Some(mean_normals(&rows))
    }
}

fn mean_normals(rows: &[&YieldRecord]) -> ClimateNormals {
    if rows.is_empty() {
        return ClimateNormals::ZERO;
    }
    let n = rows.len() as f64;
    ClimateNormals {
        rainfall_mm: round2(rows.iter().map(|r| r.rainfall_mm).sum::<f64>() / n),
        temperature_c: round2(rows.iter().map(|r| r.temperature_c).sum::<f64>() / n),
        fertilizer_kg_ha: round2(rows.iter().map(|r| r.fertilizer_kg_ha).sum::<f64>() / n),
    }
}

/// Assemble the fixed-order feature vector consumed by the forest
pub fn assemble_features(
    district_code: usize,
    crop_code: usize,
    ph: f64,
    year: i32,
    normals: &ClimateNormals,
) -> Vec<f64> {
    vec![
        district_code as f64,
        crop_code as f64,
        ph,
        f64::from(year),
        normals.rainfall_mm,
        normals.temperature_c,
        normals.fertilizer_kg_ha,
    ]
}
