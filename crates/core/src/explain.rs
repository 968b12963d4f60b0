//! Fixed explanation rules for predicted yield categories
//!
//! The explanation has no learned component: it is a rule table keyed on
//! the predicted category plus threshold checks on the inputs the model
//! actually consumed.

/// Below this rainfall the season counts as dry (mm)
pub const LOW_RAINFALL_MM: f64 = 1000.0;

/// Above this temperature the season counts as hot (°C)
pub const HIGH_TEMPERATURE_C: f64 = 35.0;

/// Soil pH range considered balanced
pub const PH_BALANCED_MIN: f64 = 6.0;
pub const PH_BALANCED_MAX: f64 = 7.5;

/// Human-readable reason for a predicted category.
///
/// "Good" and "Average" map to fixed sentences; anything else takes the
/// low-yield branch, which names whichever thresholds the inputs violate.
pub fn explain(category: &str, rainfall_mm: f64, temperature_c: f64, ph: f64) -> String {
    match category {
        "Good" => "The combination of balanced pH levels and optimal rainfall and \
                   temperature conditions is ideal for a high yield."
            .to_string(),
        "Average" => "The conditions are adequate, but factors like rainfall or \
                      temperature are slightly below the ideal range, leading to an \
                      average yield."
            .to_string(),
        _ => {
            let mut causes = Vec::new();
            if rainfall_mm < LOW_RAINFALL_MM {
                causes.push("low rainfall");
            }
            if temperature_c > HIGH_TEMPERATURE_C {
                causes.push("high temperature");
            }
            if ph < PH_BALANCED_MIN || ph > PH_BALANCED_MAX {
                causes.push("unbalanced pH level");
            }

            if causes.is_empty() {
                "The conditions are not ideal for this crop.".to_string()
            } else {
                format!("The yield is low due to {}.", causes.join(" and "))
            }
        }
    }
}
