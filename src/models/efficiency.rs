use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Input parameters ────────────────────────────────────────────────────────

/// Environmental and equipment parameters describing one panel at one moment.
///
/// Serialised as a flat JSON object; this is also the body sent to the remote
/// `/predict` endpoint. Values outside their declared domain are accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ParameterVector {
    /// Plane irradiance (W/m², 0–1200)
    pub irradiance: f64,
    /// Cleanliness factor (0.3–1.0, 1.0 = perfectly clean)
    pub soiling_ratio: f64,
    /// Panel age (years, 0–35)
    pub panel_age: f64,
    /// Ambient temperature (°C, -10–50)
    pub temperature: f64,
    /// Relative humidity (%, 0–100)
    pub humidity: f64,
    /// Cloud coverage (%, 0–100)
    pub cloud_coverage: f64,
    /// Module temperature (°C, 0–65)
    pub module_temperature: f64,
    /// Wind speed (m/s, 0–15)
    pub wind_speed: f64,

    // ── Auxiliary, carried through but unused by the local estimator ────────
    #[serde(default)]
    pub voltage: f64,
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub maintenance_count: f64,
}

impl Default for ParameterVector {
    fn default() -> Self {
        Self {
            irradiance: 800.0,
            soiling_ratio: 0.9,
            panel_age: 5.0,
            temperature: 25.0,
            humidity: 50.0,
            cloud_coverage: 20.0,
            module_temperature: 35.0,
            wind_speed: 3.0,
            voltage: 30.0,
            current: 8.0,
            pressure: 1013.0,
            maintenance_count: 2.0,
        }
    }
}

/// Declared domain of each required parameter: (name, min, max).
pub const PARAMETER_DOMAINS: [(&str, f64, f64); 8] = [
    ("irradiance", 0.0, 1200.0),
    ("soiling_ratio", 0.3, 1.0),
    ("panel_age", 0.0, 35.0),
    ("temperature", -10.0, 50.0),
    ("humidity", 0.0, 100.0),
    ("cloud_coverage", 0.0, 100.0),
    ("module_temperature", 0.0, 65.0),
    ("wind_speed", 0.0, 15.0),
];

impl ParameterVector {
    pub fn with_panel_age(mut self, years: f64) -> Self {
        self.panel_age = years;
        self
    }

    fn required_values(&self) -> [f64; 8] {
        [
            self.irradiance,
            self.soiling_ratio,
            self.panel_age,
            self.temperature,
            self.humidity,
            self.cloud_coverage,
            self.module_temperature,
            self.wind_speed,
        ]
    }

    /// Required parameters lying outside their declared domain.
    /// Informational only: nothing downstream rejects such a vector.
    pub fn out_of_range(&self) -> Vec<OutOfRange> {
        PARAMETER_DOMAINS
            .iter()
            .zip(self.required_values())
            .filter(|((_, min, max), value)| *value < *min || *value > *max)
            .map(|((field, min, max), value)| OutOfRange {
                field: field.to_string(),
                value,
                min: *min,
                max: *max,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OutOfRange {
    pub field: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} outside declared range [{}, {}]",
            self.field, self.value, self.min, self.max
        )
    }
}

// ─── Estimation result ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum QualityLabel {
    Low,
    Moderate,
    Good,
    Excellent,
}

impl QualityLabel {
    pub fn from_efficiency(efficiency: f64) -> Self {
        if efficiency < 0.30 {
            QualityLabel::Low
        } else if efficiency < 0.50 {
            QualityLabel::Moderate
        } else if efficiency < 0.70 {
            QualityLabel::Good
        } else {
            QualityLabel::Excellent
        }
    }
}

/// Distinguishes an authoritative model result from the local approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Model,
    Simulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EfficiencyResult {
    /// Fraction of theoretical maximum power, in [0.10, 0.85] for local results
    pub efficiency: f64,
    pub quality_label: QualityLabel,
    pub confidence: Confidence,
}

// ─── Yearly evolution ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PanelStatus {
    Good,
    Acceptable,
    Replace,
}

impl PanelStatus {
    pub fn from_efficiency_percent(percent: f64) -> Self {
        if percent >= 60.0 {
            PanelStatus::Good
        } else if percent >= 45.0 {
            PanelStatus::Acceptable
        } else {
            PanelStatus::Replace
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct YearlyRecord {
    pub year: u32,
    pub efficiency_percent: f64,
    pub annual_production_kwh: f64,
    /// Loss relative to year 0 (%)
    pub degradation_percent: f64,
    pub status: PanelStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EvolutionSummary {
    pub years_simulated: u32,
    pub lifetime_production_kwh: f64,
    pub final_efficiency_percent: f64,
    pub final_degradation_percent: f64,
    /// First year the panel falls into the Replace band, if it ever does
    pub first_replace_year: Option<u32>,
}

// ─── Maintenance scenarios ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum MaintenanceScenario {
    #[serde(rename = "No Maintenance")]
    NoMaintenance,
    #[serde(rename = "Minimal Maintenance")]
    Minimal,
    #[serde(rename = "Regular Maintenance")]
    Regular,
    #[serde(rename = "Optimal Maintenance")]
    Optimal,
}

impl MaintenanceScenario {
    pub const ALL: [MaintenanceScenario; 4] = [
        MaintenanceScenario::NoMaintenance,
        MaintenanceScenario::Minimal,
        MaintenanceScenario::Regular,
        MaintenanceScenario::Optimal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MaintenanceScenario::NoMaintenance => "No Maintenance",
            MaintenanceScenario::Minimal => "Minimal Maintenance",
            MaintenanceScenario::Regular => "Regular Maintenance",
            MaintenanceScenario::Optimal => "Optimal Maintenance",
        }
    }

    /// Soiling ratio lost per year without cleaning.
    pub fn soiling_decay_per_year(self) -> f64 {
        match self {
            MaintenanceScenario::NoMaintenance => 0.015,
            MaintenanceScenario::Minimal => 0.008,
            MaintenanceScenario::Regular => 0.003,
            MaintenanceScenario::Optimal => 0.0,
        }
    }

    /// Efficiency credited per year of upkeep.
    pub fn maintenance_bonus_per_year(self) -> f64 {
        match self {
            MaintenanceScenario::NoMaintenance => 0.0,
            MaintenanceScenario::Minimal => 0.002,
            MaintenanceScenario::Regular => 0.005,
            MaintenanceScenario::Optimal => 0.008,
        }
    }
}

impl fmt::Display for MaintenanceScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Efficiency percent of every scenario at one sampled year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceScenarioPoint {
    pub year: u32,
    #[schema(value_type = Object)]
    pub values: BTreeMap<MaintenanceScenario, f64>,
}

impl MaintenanceScenarioPoint {
    pub fn value(&self, scenario: MaintenanceScenario) -> Option<f64> {
        self.values.get(&scenario).copied()
    }
}

// ─── Prediction gateway ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Remote,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PredictionOutcome {
    pub result: EfficiencyResult,
    pub source: PredictionSource,
    /// Advisory set when a remote call failed and the local model answered instead
    pub warning: Option<String>,
}

// ─── Remote service wire types ───────────────────────────────────────────────

/// Body returned by the remote `/predict` endpoint. Every field is optional so
/// shape mismatches surface as validation errors rather than decode panics.
#[derive(Debug, Deserialize)]
pub struct RemotePredictionResponse {
    pub efficiency: Option<f64>,
    pub confidence: Option<String>,
}

// ─── Static model exposition ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModelInfo {
    pub model_type: String,
    pub version: String,
    pub description: String,
    pub features: Vec<String>,
    pub efficiency_min: f64,
    pub efficiency_max: f64,
    pub reference_panel_power_w: f64,
    pub annual_sun_hours: f64,
}

// ─── REST API response types ─────────────────────────────────────────────────

/// Everything derived from one parameter snapshot. Replaced wholesale on update.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    pub generation: u64,
    pub computed_at: DateTime<Utc>,
    pub parameters: ParameterVector,
    pub estimate: EfficiencyResult,
    pub evolution: Vec<YearlyRecord>,
    pub summary: Option<EvolutionSummary>,
    pub maintenance: Vec<MaintenanceScenarioPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParameterUpdateResponse {
    pub generation: u64,
    pub warnings: Vec<OutOfRange>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PredictionResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Snapshot generation the prediction was started from
    pub generation: u64,
    /// True when the parameters changed while the prediction was in flight
    pub stale: bool,
    pub parameters: ParameterVector,
    pub result: EfficiencyResult,
    pub source: PredictionSource,
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GatewayStatus {
    pub mode: GatewayMode,
    pub base_url: String,
    pub last_health_check: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub gateway_mode: GatewayMode,
    pub generation: u64,
}
