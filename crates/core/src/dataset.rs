//! Historical crop-yield dataset
//!
//! Loads the flat CSV once at startup and serves read-only filtered views.
//! The table is never mutated after load; every query borrows from it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{CoreError, Result};

/// Expected CSV header, in column order
pub const CSV_HEADER: [&str; 9] = [
    "District",
    "Crop",
    "Year",
    "Rainfall (mm)",
    "Temperature (°C)",
    "Fertilizer Used (kg/ha)",
    "pH Level",
    "Previous Year Yield (ton/ha)",
    "Yield Category",
];

/// One season's recorded outcome for a (district, crop) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRecord {
    pub district: String,
    pub crop: String,
    pub year: i32,
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub fertilizer_kg_ha: f64,
    pub ph: f64,
    pub prev_yield_ton_ha: f64,
    pub category: String,
}

/// Immutable in-memory table of historical records
#[derive(Debug, Clone, Default)]
pub struct HistoryTable {
    records: Vec<YieldRecord>,
}

impl HistoryTable {
    /// Load the table from a CSV file.
    ///
    /// Rows with any blank field are dropped, mirroring the cleaning step
    /// the trainer applies. Non-blank values that fail to parse are an
    /// error, reported with their line number.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            CoreError::Dataset(format!("failed to read {}: {err}", path.display()))
        })?;

        let mut lines = content.lines().enumerate();
        let header = loop {
            match lines.next() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((_, line)) => break line,
                None => return Err(CoreError::Dataset("dataset is empty".to_string())),
            }
        };
        validate_header(header)?;

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for (idx, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != CSV_HEADER.len() {
                return Err(CoreError::Dataset(format!(
                    "line {}: expected {} columns, got {}",
                    idx + 1,
                    CSV_HEADER.len(),
                    fields.len()
                )));
            }

            if fields.iter().any(|f| f.is_empty()) {
                dropped += 1;
                continue;
            }

            records.push(YieldRecord {
                district: fields[0].to_string(),
                crop: fields[1].to_string(),
                year: parse_field(fields[2], idx, "Year")?,
                rainfall_mm: parse_field(fields[3], idx, "Rainfall (mm)")?,
                temperature_c: parse_field(fields[4], idx, "Temperature (°C)")?,
                fertilizer_kg_ha: parse_field(fields[5], idx, "Fertilizer Used (kg/ha)")?,
                ph: parse_field(fields[6], idx, "pH Level")?,
                prev_yield_ton_ha: parse_field(fields[7], idx, "Previous Year Yield (ton/ha)")?,
                category: fields[8].to_string(),
            });
        }

        if records.is_empty() {
            return Err(CoreError::Dataset(format!(
                "no usable rows in {}",
                path.display()
            )));
        }

        info!(
            rows = records.len(),
            dropped, "loaded historical dataset from {}", path.display()
        );

        Ok(Self { records })
    }

    /// Build a table from already-parsed records
    pub fn from_records(records: Vec<YieldRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[YieldRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for `district` with `from_year <= year < until_year`
    pub fn district_window(
        &self,
        district: &str,
        from_year: i32,
        until_year: i32,
    ) -> Vec<&YieldRecord> {
        self.records
            .iter()
            .filter(|r| r.district == district && r.year >= from_year && r.year < until_year)
            .collect()
    }

    /// Records for any district with `from_year <= year < until_year`
    pub fn year_window(&self, from_year: i32, until_year: i32) -> Vec<&YieldRecord> {
        self.records
            .iter()
            .filter(|r| r.year >= from_year && r.year < until_year)
            .collect()
    }

    /// All of a district's records for one exact year
    pub fn district_year(&self, district: &str, year: i32) -> Vec<&YieldRecord> {
        self.records
            .iter()
            .filter(|r| r.district == district && r.year == year)
            .collect()
    }

    /// The single record for an exact (district, crop, year), if present
    pub fn find(&self, district: &str, crop: &str, year: i32) -> Option<&YieldRecord> {
        let found = self
            .records
            .iter()
            .find(|r| r.district == district && r.crop == crop && r.year == year);
        if found.is_none() {
            debug!(district, crop, year, "no historical record");
        }
        found
    }

    /// Records matching a yield category, optionally restricted to one crop
    pub fn category_rows(&self, crop: Option<&str>, category: &str) -> Vec<&YieldRecord> {
        self.records
            .iter()
            .filter(|r| r.category == category && crop.is_none_or(|c| r.crop == c))
            .collect()
    }

    /// Distinct district names, sorted
    pub fn districts(&self) -> Vec<String> {
        let mut out: Vec<String> = self.records.iter().map(|r| r.district.clone()).collect();
        out.sort();
        out.dedup();
        out
    }

    /// Distinct crop names, sorted
    pub fn crops(&self) -> Vec<String> {
        let mut out: Vec<String> = self.records.iter().map(|r| r.crop.clone()).collect();
        out.sort();
        out.dedup();
        out
    }

    /// Distinct years, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut out: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

fn validate_header(line: &str) -> Result<()> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields != CSV_HEADER {
        return Err(CoreError::Dataset(format!(
            "unexpected CSV header: {line:?}"
        )));
    }
    Ok(())
}

fn parse_field<T: std::str::FromStr>(raw: &str, line_idx: usize, column: &str) -> Result<T> {
    raw.parse::<T>().map_err(|_| {
        CoreError::Dataset(format!(
            "line {}: invalid {column} value {raw:?}",
            line_idx + 1
        ))
    })
}
