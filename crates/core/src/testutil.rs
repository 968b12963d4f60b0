//! Shared fixtures for unit tests

use crate::dataset::YieldRecord;

#[allow(clippy::too_many_arguments)]
pub(crate) fn record(
    district: &str,
    crop: &str,
    year: i32,
    rainfall_mm: f64,
    temperature_c: f64,
    fertilizer_kg_ha: f64,
    ph: f64,
    prev_yield_ton_ha: f64,
    category: &str,
) -> YieldRecord {
    YieldRecord {
        district: district.to_string(),
        crop: crop.to_string(),
        year,
        rainfall_mm,
        temperature_c,
        fertilizer_kg_ha,
        ph,
        prev_yield_ton_ha,
        category: category.to_string(),
    }
}

pub(crate) fn sample_records() -> Vec<YieldRecord> {
    vec![
        record("Thanjavur", "Rice", 2020, 1100.0, 31.0, 120.0, 6.5, 4.2, "Good"),
        record("Thanjavur", "Rice", 2021, 800.0, 36.0, 100.0, 5.5, 2.1, "Bad"),
        record("Thanjavur", "Maize", 2021, 950.0, 33.0, 90.0, 6.8, 3.0, "Average"),
        record("Madurai", "Rice", 2021, 700.0, 37.0, 80.0, 5.8, 1.9, "Bad"),
    ]
}
