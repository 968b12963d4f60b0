//! Plain-text report rendering for prediction results

use crate::predictor::Prediction;

/// Render the downloadable report for one prediction
pub fn render_prediction_report(prediction: &Prediction) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Crop Yield Prediction Report for {} in {} - {}\n\n",
        prediction.crop, prediction.district, prediction.year
    ));

    out.push_str("Input Parameters:\n");
    out.push_str("------------------\n");
    out.push_str(&format!("pH Level: {}\n", prediction.ph));
    out.push_str(&format!(
        "Average Rainfall: {} mm\n",
        prediction.normals.rainfall_mm
    ));
    out.push_str(&format!(
        "Average Temperature: {} °C\n",
        prediction.normals.temperature_c
    ));
    out.push_str(&format!(
        "Average Fertilizer: {} kg/ha\n\n",
        prediction.normals.fertilizer_kg_ha
    ));

    out.push_str("Prediction Results:\n");
    out.push_str("-------------------\n\n");
    out.push_str(&format!(
        "{} -> {}\n",
        prediction.crop, prediction.category
    ));
    out.push_str(&format!(
        "Estimated Yield: {} kg/acre\n",
        prediction.estimated_yield_kg_acre
    ));
    out.push_str(&format!("Reason: {}\n", prediction.reason));

    out
}
