//! Year-by-year projection of a panel's efficiency as it ages.

use crate::models::efficiency::{EvolutionSummary, PanelStatus, ParameterVector, YearlyRecord};
use crate::services::efficiency_estimator::{estimate, round1};

pub const DEFAULT_MAX_YEARS: u32 = 35;

/// Reference module used for production figures.
pub const PANEL_POWER_W: f64 = 400.0;
pub const ANNUAL_SUN_HOURS: f64 = 1500.0;

/// Project `base` over `0..=max_years`, overriding only `panel_age`.
///
/// Each year is estimated independently; the year-0 efficiency is captured
/// once and used as the degradation reference.
pub fn generate_evolution(base: &ParameterVector, max_years: u32) -> Vec<YearlyRecord> {
    let mut records = Vec::with_capacity(max_years as usize + 1);
    let mut reference_percent = None;

    for year in 0..=max_years {
        let result = estimate(&base.with_panel_age(year as f64));
        let efficiency_percent = round1(result.efficiency * 100.0);
        let reference = *reference_percent.get_or_insert(efficiency_percent);

        let annual_production_kwh =
            (PANEL_POWER_W * ANNUAL_SUN_HOURS * result.efficiency / 1000.0).round();
        let degradation_percent = round1((reference - efficiency_percent) / reference * 100.0);

        let record = YearlyRecord {
            year,
            efficiency_percent,
            annual_production_kwh,
            degradation_percent,
            status: PanelStatus::from_efficiency_percent(efficiency_percent),
        };

        #[cfg(feature = "verbose_log")]
        tracing::trace!(
            year,
            efficiency_percent,
            annual_production_kwh,
            degradation_percent,
            status = ?record.status,
            "evolution year"
        );

        records.push(record);
    }

    records
}

/// Aggregate figures for an evolution sequence; `None` when it is empty.
pub fn summarize_evolution(records: &[YearlyRecord]) -> Option<EvolutionSummary> {
    let last = records.last()?;
    Some(EvolutionSummary {
        years_simulated: last.year,
        lifetime_production_kwh: records.iter().map(|r| r.annual_production_kwh).sum(),
        final_efficiency_percent: last.efficiency_percent,
        final_degradation_percent: last.degradation_percent,
        first_replace_year: records
            .iter()
            .find(|r| r.status == PanelStatus::Replace)
            .map(|r| r.year),
    })
}
