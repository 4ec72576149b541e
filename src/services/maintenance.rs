//! Side-by-side efficiency projection for the fixed maintenance policies.
//!
//! Every point is a direct function of (base, year, scenario): soiling and
//! maintenance count at year `y` are computed from `y`, not accumulated.

use std::collections::BTreeMap;

use crate::models::efficiency::{MaintenanceScenario, MaintenanceScenarioPoint, ParameterVector};
use crate::services::efficiency_estimator::{estimate, round1};

pub const SAMPLE_YEARS: [u32; 7] = [0, 5, 10, 15, 20, 25, 30];

/// Soiling ratio assumed for a freshly installed panel.
pub const INITIAL_SOILING_RATIO: f64 = 0.85;
/// Soiling never decays below this floor.
pub const MIN_SOILING_RATIO: f64 = 0.4;
pub const MAX_LIFETIME_MAINTENANCE_EVENTS: u32 = 10;

/// Efficiency shared by all scenarios at year 0.
pub fn reference_efficiency(base: &ParameterVector) -> f64 {
    let fresh = ParameterVector {
        panel_age: 0.0,
        soiling_ratio: INITIAL_SOILING_RATIO,
        maintenance_count: 0.0,
        ..*base
    };
    estimate(&fresh).efficiency
}

/// Efficiency (fraction) of `scenario` at `year`, capped at `reference`.
fn scenario_efficiency(
    base: &ParameterVector,
    scenario: MaintenanceScenario,
    year: u32,
    reference: f64,
) -> f64 {
    let y = year as f64;
    let soiling = (INITIAL_SOILING_RATIO - scenario.soiling_decay_per_year() * y).max(MIN_SOILING_RATIO);
    let aged = ParameterVector {
        panel_age: y,
        soiling_ratio: soiling,
        maintenance_count: year.min(MAX_LIFETIME_MAINTENANCE_EVENTS) as f64,
        ..*base
    };
    let efficiency = estimate(&aged).efficiency + scenario.maintenance_bonus_per_year() * y;
    efficiency.min(reference)
}

pub fn generate_comparison(base: &ParameterVector) -> Vec<MaintenanceScenarioPoint> {
    let reference = reference_efficiency(base);
    let reference_percent = round1(reference * 100.0);

    let points: Vec<MaintenanceScenarioPoint> = SAMPLE_YEARS
        .iter()
        .map(|&year| {
            let values: BTreeMap<MaintenanceScenario, f64> = MaintenanceScenario::ALL
                .iter()
                .map(|&scenario| {
                    let percent = if year == 0 {
                        reference_percent
                    } else {
                        round1(scenario_efficiency(base, scenario, year, reference) * 100.0)
                    };
                    (scenario, percent)
                })
                .collect();
            MaintenanceScenarioPoint { year, values }
        })
        .collect();

    if let Some(last) = points.last() {
        tracing::debug!(
            reference_percent,
            year = last.year,
            no_maintenance = ?last.value(MaintenanceScenario::NoMaintenance),
            optimal = ?last.value(MaintenanceScenario::Optimal),
            "maintenance comparison generated"
        );
    }

    points
}
