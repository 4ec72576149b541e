/// ============================================================
///  Local Efficiency Estimator
///
///  Deterministic linear model used whenever the remote model is
///  unavailable, and as the kernel of every projection:
///   1. Base efficiency          – 0.30
///   2. Irradiance gain          – +0.35 per 1000 W/m²
///   3. Soiling                  – +0.15 × cleanliness
///   4. Ageing                   – −0.08 over a 35-year life
///   5. Heat above 25 °C         – −0.03 per 100 °C
///   6. Humidity / cloud cover   – −0.02 each at 100 %
///  The sum is clamped to [0.10, 0.85]. Inputs are never rejected.
/// ============================================================

use crate::models::efficiency::{Confidence, EfficiencyResult, ParameterVector, QualityLabel};

pub const MIN_EFFICIENCY: f64 = 0.10;
pub const MAX_EFFICIENCY: f64 = 0.85;

const BASE_EFFICIENCY: f64 = 0.30;
const IRRADIANCE_WEIGHT: f64 = 0.35;
const SOILING_WEIGHT: f64 = 0.15;
const AGE_WEIGHT: f64 = 0.08;
const REFERENCE_LIFETIME_YEARS: f64 = 35.0;
const HEAT_WEIGHT: f64 = 0.03;
const STC_TEMPERATURE_C: f64 = 25.0;
const HUMIDITY_WEIGHT: f64 = 0.02;
const CLOUD_WEIGHT: f64 = 0.02;

/// Unclamped linear efficiency.
fn raw_efficiency(p: &ParameterVector) -> f64 {
    BASE_EFFICIENCY
        + (p.irradiance / 1000.0) * IRRADIANCE_WEIGHT
        + p.soiling_ratio * SOILING_WEIGHT
        - (p.panel_age / REFERENCE_LIFETIME_YEARS) * AGE_WEIGHT
        - (p.temperature - STC_TEMPERATURE_C).max(0.0) / 100.0 * HEAT_WEIGHT
        - (p.humidity / 100.0) * HUMIDITY_WEIGHT
        - (p.cloud_coverage / 100.0) * CLOUD_WEIGHT
}

/// Estimate panel efficiency from a parameter vector. Pure; never fails.
pub fn estimate(params: &ParameterVector) -> EfficiencyResult {
    let efficiency = raw_efficiency(params).clamp(MIN_EFFICIENCY, MAX_EFFICIENCY);
    EfficiencyResult {
        efficiency,
        quality_label: QualityLabel::from_efficiency(efficiency),
        confidence: Confidence::Simulated,
    }
}

/// Round to one decimal place, as used for every reported percentage.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_vector() -> ParameterVector {
        ParameterVector {
            irradiance: 500.0,
            soiling_ratio: 0.7,
            panel_age: 10.0,
            temperature: 25.0,
            humidity: 50.0,
            cloud_coverage: 30.0,
            ..ParameterVector::default()
        }
    }

    #[test]
    fn test_worked_example() {
        let r = estimate(&example_vector());
        assert!((r.efficiency - 0.5411).abs() < 1e-4, "got {}", r.efficiency);
        assert_eq!(round1(r.efficiency * 100.0), 54.1);
        assert_eq!(r.quality_label, QualityLabel::Good);
        assert_eq!(r.confidence, Confidence::Simulated);
    }

    #[test]
    fn test_bounds_hold_for_extreme_inputs() {
        let best = ParameterVector {
            irradiance: 1200.0,
            soiling_ratio: 1.0,
            panel_age: 0.0,
            temperature: -10.0,
            humidity: 0.0,
            cloud_coverage: 0.0,
            ..ParameterVector::default()
        };
        let worst = ParameterVector {
            irradiance: 0.0,
            soiling_ratio: 0.3,
            panel_age: 35.0,
            temperature: 50.0,
            humidity: 100.0,
            cloud_coverage: 100.0,
            ..ParameterVector::default()
        };
        assert_eq!(estimate(&best).efficiency, MAX_EFFICIENCY);
        assert_eq!(estimate(&best).quality_label, QualityLabel::Excellent);
        let w = estimate(&worst).efficiency;
        assert!((MIN_EFFICIENCY..=MAX_EFFICIENCY).contains(&w));

        // Far outside the declared domain: still clamped, never rejected.
        let absurd = ParameterVector {
            irradiance: -5000.0,
            panel_age: 500.0,
            ..ParameterVector::default()
        };
        assert_eq!(estimate(&absurd).efficiency, MIN_EFFICIENCY);
        assert_eq!(estimate(&absurd).quality_label, QualityLabel::Low);
    }

    #[test]
    fn test_bounds_over_grid() {
        for irr in [0.0, 300.0, 600.0, 900.0, 1200.0] {
            for soil in [0.3, 0.65, 1.0] {
                for age in [0.0, 17.0, 35.0] {
                    for temp in [-10.0, 25.0, 50.0] {
                        let p = ParameterVector {
                            irradiance: irr,
                            soiling_ratio: soil,
                            panel_age: age,
                            temperature: temp,
                            ..ParameterVector::default()
                        };
                        let e = estimate(&p).efficiency;
                        assert!((MIN_EFFICIENCY..=MAX_EFFICIENCY).contains(&e), "{p:?} -> {e}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_irradiance_age_and_soiling() {
        let base = example_vector();
        let mut prev = 0.0;
        for step in 0..=24 {
            let e = estimate(&ParameterVector { irradiance: step as f64 * 50.0, ..base }).efficiency;
            assert!(e >= prev, "irradiance step {step}");
            prev = e;
        }

        let mut prev = f64::MAX;
        for age in 0..=35 {
            let e = estimate(&base.with_panel_age(age as f64)).efficiency;
            assert!(e <= prev, "age {age}");
            prev = e;
        }

        let mut prev = 0.0;
        for step in 30..=100 {
            let e = estimate(&ParameterVector { soiling_ratio: step as f64 / 100.0, ..base }).efficiency;
            assert!(e >= prev, "soiling step {step}");
            prev = e;
        }
    }

    #[test]
    fn test_heat_penalty_only_above_25c() {
        let base = example_vector();
        let cold = estimate(&ParameterVector { temperature: 0.0, ..base }).efficiency;
        let mild = estimate(&ParameterVector { temperature: 25.0, ..base }).efficiency;
        let hot = estimate(&ParameterVector { temperature: 45.0, ..base }).efficiency;
        assert_eq!(cold, mild);
        assert!((mild - hot - 0.006).abs() < 1e-12);
    }

    #[test]
    fn test_idempotent() {
        let p = example_vector();
        let a = estimate(&p);
        let b = estimate(&p);
        assert_eq!(a.efficiency.to_bits(), b.efficiency.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_auxiliary_fields_ignored() {
        let p = example_vector();
        let q = ParameterVector { voltage: 999.0, current: 42.0, pressure: 1.0, maintenance_count: 7.0, ..p };
        assert_eq!(estimate(&p), estimate(&q));
    }
}
