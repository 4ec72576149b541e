//! Static model exposition data served alongside predictions.

use crate::models::efficiency::{FeatureImportance, ModelInfo};
use crate::services::efficiency_estimator::{MAX_EFFICIENCY, MIN_EFFICIENCY};
use crate::services::evolution::{ANNUAL_SUN_HOURS, PANEL_POWER_W};

const FEATURE_WEIGHTS: [(&str, f64); 6] = [
    ("irradiance", 0.35),
    ("soiling_ratio", 0.20),
    ("panel_age", 0.15),
    ("temperature", 0.12),
    ("cloud_coverage", 0.10),
    ("humidity", 0.08),
];

/// Relative importance of the six driving factors; sums to 1.0.
pub fn feature_importance() -> Vec<FeatureImportance> {
    FEATURE_WEIGHTS
        .iter()
        .map(|(feature, importance)| FeatureImportance {
            feature: feature.to_string(),
            importance: *importance,
        })
        .collect()
}

pub fn model_info() -> ModelInfo {
    ModelInfo {
        model_type: "linear-clamped".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Local linear efficiency model used when the remote predictor is unavailable"
            .to_string(),
        features: FEATURE_WEIGHTS.iter().map(|(f, _)| f.to_string()).collect(),
        efficiency_min: MIN_EFFICIENCY,
        efficiency_max: MAX_EFFICIENCY,
        reference_panel_power_w: PANEL_POWER_W,
        annual_sun_hours: ANNUAL_SUN_HOURS,
    }
}
