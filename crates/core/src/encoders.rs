//! Fitted categorical encoders
//!
//! An encoder maps a finite, sorted set of category strings to `0..n`
//! integers. It is fitted once at training time and reused verbatim at
//! inference time: the set of categories seen at inference must be a
//! subset of the categories seen at training, or `transform` fails with
//! a typed error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::dataset::HistoryTable;
use crate::errors::{CoreError, Result};

/// A deterministic category-string to integer mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Which column this encoder was fitted on
    pub field: String,
    /// Classes in sorted order; the code of a class is its index here
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder over the given values. Duplicates collapse and the
    /// resulting classes are sorted, so fitting is order-independent.
    pub fn fit<'a, I>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        Self {
            field: field.to_string(),
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    /// Encode a category string
    pub fn transform(&self, value: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| CoreError::UnknownCategory {
                field: self.field.clone(),
                value: value.to_string(),
            })
    }

    /// Decode an integer code back to its category string
    pub fn inverse(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| CoreError::CodeOutOfRange {
                field: self.field.clone(),
                code,
                classes: self.classes.len(),
            })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// The three encoders the system persists and reloads together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSet {
    pub district: LabelEncoder,
    pub crop: LabelEncoder,
    pub category: LabelEncoder,
}

impl EncoderSet {
    /// Fit all three encoders over the full historical table
    pub fn fit(history: &HistoryTable) -> Self {
        Self {
            district: LabelEncoder::fit(
                "district",
                history.records().iter().map(|r| r.district.as_str()),
            ),
            crop: LabelEncoder::fit("crop", history.records().iter().map(|r| r.crop.as_str())),
            category: LabelEncoder::fit(
                "yield category",
                history.records().iter().map(|r| r.category.as_str()),
            ),
        }
    }
}
