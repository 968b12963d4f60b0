//! Inference and analysis over injected artifacts
//!
//! A [`Predictor`] owns the loaded dataset, encoders, and model as plain
//! values. Nothing here reaches for process-wide state, so the whole
//! pipeline is testable without artifacts on disk.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{HistoryTable, YieldRecord};
use crate::encoders::EncoderSet;
use crate::errors::Result;
use crate::explain::explain;
use crate::features::{
    assemble_features, derive_climate_normals, round2, year_snapshot, ClimateNormals,
};
use crate::forest::Model;

/// Conversion factor: ton/ha to kg/acre (1 ton = 1000 kg, 1 ha = 2.47105 acres)
pub const TON_HA_TO_KG_ACRE: f64 = 1000.0 / 2.47105;

/// Outcome of a forward-looking prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub district: String,
    pub crop: String,
    pub year: i32,
    pub ph: f64,
    /// Historical-average proxy inputs the model consumed
    pub normals: ClimateNormals,
    /// Predicted yield category
    pub category: String,
    /// Historical-lookup estimate in kg/acre
    pub estimated_yield_kg_acre: f64,
    /// Rule-table explanation
    pub reason: String,
}

/// Outcome of a backward-looking analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub district: String,
    pub crop: String,
    pub year: i32,
    /// District-wide climate means for that year, when any crop was recorded
    pub snapshot: Option<ClimateNormals>,
    pub outcome: AnalysisOutcome,
}

/// Either the literal historical record or an explicit empty result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Record {
        record: YieldRecord,
        narrative: String,
    },
    NoData,
}

/// Prediction and analysis engine over read-only loaded state
#[derive(Debug, Clone)]
pub struct Predictor {
    history: HistoryTable,
    encoders: EncoderSet,
    model: Model,
}

impl Predictor {
    pub fn new(history: HistoryTable, encoders: EncoderSet, model: Model) -> Self {
        Self {
            history,
            encoders,
            model,
        }
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Predict the yield category for a target season.
    ///
    /// Derives proxy climate inputs, runs the forest, decodes the class,
    /// estimates a numeric yield from history, and attaches the rule-table
    /// explanation. Unknown districts or crops fail with a typed error.
    pub fn predict(&self, district: &str, crop: &str, year: i32, ph: f64) -> Result<Prediction> {
        let district_code = self.encoders.district.transform(district)?;
        let crop_code = self.encoders.crop.transform(crop)?;

        let normals = derive_climate_normals(&self.history, district, year);
        let features = assemble_features(district_code, crop_code, ph, year, &normals);

        let class = self.model.predict(&features)?;
        let category = self.encoders.category.inverse(class)?.to_string();

        debug!(district, crop, year, class, %category, "forest classification");

        let estimated_yield_kg_acre = self.estimate_yield(crop, &category);
        let reason = explain(&category, normals.rainfall_mm, normals.temperature_c, ph);

        Ok(Prediction {
            district: district.to_string(),
            crop: crop.to_string(),
            year,
            ph,
            normals,
            category,
            estimated_yield_kg_acre,
            reason,
        })
    }

    /// Approximate numeric yield for a (crop, category) pair, in kg/acre.
    ///
    /// Mean of the matching rows' previous-year yield; when the crop has no
    /// rows in that category, the category's dataset-wide mean; when even
    /// that is empty, zero.
    pub fn estimate_yield(&self, crop: &str, category: &str) -> f64 {
        let crop_rows = self.history.category_rows(Some(crop), category);
        let rows = if crop_rows.is_empty() {
            self.history.category_rows(None, category)
        } else {
            crop_rows
        };

        if rows.is_empty() {
            return 0.0;
        }

        let mean_ton_ha =
            rows.iter().map(|r| r.prev_yield_ton_ha).sum::<f64>() / rows.len() as f64;
        round2(mean_ton_ha * TON_HA_TO_KG_ACRE)
    }

    /// Narrate the recorded outcome for a past (district, crop, year).
    ///
    /// An absent combination is an explicit [`AnalysisOutcome::NoData`],
    /// never a stale or nearby record.
    pub fn analyze(&self, district: &str, crop: &str, year: i32) -> Analysis {
        let snapshot = year_snapshot(&self.history, district, year);

        let outcome = match self.history.find(district, crop, year) {
            Some(record) => AnalysisOutcome::Record {
                record: record.clone(),
                narrative: narrate(record),
            },
            None => AnalysisOutcome::NoData,
        };

        Analysis {
            district: district.to_string(),
            crop: crop.to_string(),
            year,
            snapshot,
            outcome,
        }
    }
}

/// One-paragraph narration of a historical record, verbatim field values
fn narrate(record: &YieldRecord) -> String {
    format!(
        "In the year {}, the yield for {} in {} was categorized as {}. \
         The key factors recorded were: a rainfall of {} mm, a temperature \
         of {}°C, and a soil pH level of {}. The previous year's yield was \
         {} tons/ha, and {} kg/ha of fertilizer was used.",
        record.year,
        record.crop,
        record.district,
        record.category,
        record.rainfall_mm,
        record.temperature_c,
        record.ph,
        record.prev_yield_ton_ha,
        record.fertilizer_kg_ha,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{Node, ModelMetadata, Tree};
    use crate::testutil::record;

    fn history() -> HistoryTable {
        HistoryTable::from_records(vec![
            record("Thanjavur", "Rice", 2020, 1100.0, 31.0, 120.0, 6.5, 4.0, "Good"),
            record("Thanjavur", "Rice", 2021, 1150.0, 30.0, 118.0, 6.6, 5.0, "Good"),
            record("Thanjavur", "Rice", 2022, 700.0, 37.0, 80.0, 5.2, 1.8, "Bad"),
            record("Thanjavur", "Maize", 2021, 950.0, 33.0, 90.0, 6.8, 3.0, "Average"),
            record("Madurai", "Cotton", 2020, 600.0, 36.0, 60.0, 5.6, 2.4, "Good"),
        ])
    }

    /// Single stump voting on rainfall: dry seasons are "Bad", wet "Good".
    /// Classes follow the fitted category encoder: Average=0, Bad=1, Good=2.
    fn rainfall_stump_model() -> Model {
        let tree = Tree::new(vec![
            Node::internal(0, 4, 1000.0, 1, 2),
            Node::leaf(1, 1),
            Node::leaf(2, 2),
        ]);
        Model::new(
            vec![tree],
            7,
            3,
            ModelMetadata {
                created_at: 0,
                tree_count: 1,
                max_depth: 1,
                model_hash: String::new(),
                training_data_hash: String::new(),
            },
        )
    }

    fn predictor() -> Predictor {
        let history = history();
        let encoders = EncoderSet::fit(&history);
        Predictor::new(history, encoders, rainfall_stump_model())
    }

    #[test]
    fn predict_decodes_to_known_category() {
        let p = predictor();
        let prediction = p.predict("Thanjavur", "Rice", 2026, 6.5).unwrap();

        assert!(["Good", "Average", "Bad"].contains(&prediction.category.as_str()));
        // Thanjavur's 10-year mean rainfall is (1100+1150+700+950)/4 = 975,
        // which the stump classifies as dry.
        assert_eq!(prediction.normals.rainfall_mm, 975.0);
        assert_eq!(prediction.category, "Bad");
        assert!(prediction.reason.contains("low rainfall"));
    }

    #[test]
    fn predict_is_deterministic() {
        let p = predictor();
        let a = p.predict("Thanjavur", "Rice", 2026, 6.5).unwrap();
        let b = p.predict("Thanjavur", "Rice", 2026, 6.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn predict_rejects_unknown_district() {
        let p = predictor();
        let err = p.predict("Salem", "Rice", 2026, 6.5).unwrap_err();
        assert!(err.to_string().contains("Salem"));
    }

    #[test]
    fn yield_estimate_is_mean_of_matching_rows_converted() {
        let p = predictor();
        // Rice/Good rows have prior yields 4.0 and 5.0 ton/ha.
        let expected = round2(4.5 * TON_HA_TO_KG_ACRE);
        assert_eq!(p.estimate_yield("Rice", "Good"), expected);
    }

    #[test]
    fn yield_estimate_falls_back_to_category_mean_for_unseen_crop() {
        let p = predictor();
        // Maize has no "Good" rows; the category-wide mean covers
        // Rice (4.0, 5.0) and Cotton (2.4).
        let expected = round2((4.0 + 5.0 + 2.4) / 3.0 * TON_HA_TO_KG_ACRE);
        assert_eq!(p.estimate_yield("Maize", "Good"), expected);
    }

    #[test]
    fn yield_estimate_is_zero_when_category_absent() {
        let records = vec![record(
            "Thanjavur", "Rice", 2020, 1100.0, 31.0, 120.0, 6.5, 4.0, "Good",
        )];
        let history = HistoryTable::from_records(records);
        let encoders = EncoderSet::fit(&history);
        let p = Predictor::new(history, encoders, rainfall_stump_model());

        assert_eq!(p.estimate_yield("Rice", "Bad"), 0.0);
    }

    #[test]
    fn analysis_returns_record_verbatim() {
        let p = predictor();
        let analysis = p.analyze("Thanjavur", "Rice", 2022);

        match analysis.outcome {
            AnalysisOutcome::Record { record, narrative } => {
                assert_eq!(record.rainfall_mm, 700.0);
                assert_eq!(record.category, "Bad");
                assert!(narrative.contains("In the year 2022"));
                assert!(narrative.contains("700 mm"));
                assert!(narrative.contains("categorized as Bad"));
            }
            AnalysisOutcome::NoData => panic!("expected a record"),
        }

        // 2022 snapshot covers only the Rice row.
        assert_eq!(analysis.snapshot.unwrap().rainfall_mm, 700.0);
    }

    #[test]
    fn analysis_of_absent_combination_is_empty() {
        let p = predictor();

        let missing_year = p.analyze("Thanjavur", "Rice", 2019);
        assert_eq!(missing_year.outcome, AnalysisOutcome::NoData);
        assert!(missing_year.snapshot.is_none());

        // District-year exists but the crop was not grown: snapshot is
        // present, record is not.
        let missing_crop = p.analyze("Madurai", "Rice", 2020);
        assert_eq!(missing_crop.outcome, AnalysisOutcome::NoData);
        assert!(missing_crop.snapshot.is_some());
    }
}
