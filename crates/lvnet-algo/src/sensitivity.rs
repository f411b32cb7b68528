//! Load-growth projection of a feeder's maximum voltage drop.
//!
//! Every year of the horizon re-solves the feeder with all local demand scaled
//! by `1 + rate × year` and classifies the resulting drop against the
//! critical limit and the preventive margin.

use crate::voltage_drop::VoltageDropSolver;
use lvnet_core::{round_to, LvError, LvResult, NetworkSegment, NormativeLimits, ReferenceCatalog};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// High above the critical drop, Medium above the preventive margin
    pub fn classify(max_drop_pct: f64, limits: &NormativeLimits) -> RiskLevel {
        if max_drop_pct > limits.critical_voltage_drop_pct {
            RiskLevel::High
        } else if max_drop_pct > limits.preventive_drop_pct() {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Yearly linear growth over a horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthScenario {
    pub base_year: i32,
    /// Years projected after the base year
    pub years: u32,
    /// Fractional growth per year (0.03 = 3 %)
    pub growth_rate: f64,
}

impl Default for GrowthScenario {
    fn default() -> Self {
        Self {
            base_year: 2024,
            years: 10,
            growth_rate: 0.03,
        }
    }
}

impl GrowthScenario {
    pub fn starting(base_year: i32) -> Self {
        Self {
            base_year,
            ..Self::default()
        }
    }

    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    pub fn with_growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = rate;
        self
    }

    /// Load factor `offset` years after the base year
    pub fn load_factor(&self, offset: u32) -> f64 {
        1.0 + self.growth_rate * f64::from(offset)
    }

    /// Calendar year `offset` years after the base year, if representable
    pub fn year(&self, offset: u32) -> Option<i32> {
        i32::try_from(offset)
            .ok()
            .and_then(|offset| self.base_year.checked_add(offset))
    }

    /// Reject horizons that leave the year range or drive the load to zero.
    ///
    /// The load factor is linear in the year, so checking the last year
    /// covers the whole horizon.
    pub fn validate(&self) -> LvResult<()> {
        if !self.growth_rate.is_finite() {
            return Err(LvError::validation("growth rate must be finite"));
        }
        if self.year(self.years).is_none() {
            return Err(LvError::validation(format!(
                "a {}-year horizon from {} runs past the last representable year",
                self.years, self.base_year
            )));
        }
        let final_factor = self.load_factor(self.years);
        if final_factor <= 0.0 {
            return Err(LvError::validation(format!(
                "growth rate {} over {} years leaves a load factor of {:.2}; it must stay positive",
                self.growth_rate, self.years, final_factor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub year: i32,
    pub load_factor: f64,
    pub max_drop_pct: f64,
    pub risk: RiskLevel,
    pub is_global_compliant: bool,
}

/// Project the feeder from the base year through `scenario.years` (inclusive).
///
/// `solver` supplies transformer rating, demand class and voltages; its load
/// factor is replaced year by year.
pub fn run_sensitivity(
    solver: &VoltageDropSolver,
    segments: &[NetworkSegment],
    catalog: &ReferenceCatalog,
    scenario: &GrowthScenario,
) -> LvResult<Vec<SensitivityPoint>> {
    scenario.validate()?;

    let project = |offset: u32| -> LvResult<SensitivityPoint> {
        let year = scenario
            .year(offset)
            .ok_or_else(|| LvError::validation("projection year out of range"))?;
        let factor = scenario.load_factor(offset);
        let result = solver
            .clone()
            .with_load_factor(factor)
            .solve(segments, catalog)?;
        let risk = RiskLevel::classify(result.max_drop_pct, &catalog.limits);
        Ok(SensitivityPoint {
            year,
            load_factor: round_to(factor, 2),
            max_drop_pct: result.max_drop_pct,
            risk,
            is_global_compliant: result.is_global_compliant,
        })
    };

    #[cfg(feature = "parallel")]
    let points = (0..=scenario.years)
        .into_par_iter()
        .map(project)
        .collect::<LvResult<Vec<_>>>()?;
    #[cfg(not(feature = "parallel"))]
    let points = (0..=scenario.years)
        .map(project)
        .collect::<LvResult<Vec<_>>>()?;

    debug!(
        years = points.len(),
        first_high = points
            .iter()
            .find(|p| p.risk == RiskLevel::High)
            .map(|p| p.year),
        "load-growth projection"
    );

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvnet_core::{ClientCounts, Meters};

    #[test]
    fn test_risk_thresholds() {
        let limits = NormativeLimits::default();
        assert_eq!(RiskLevel::classify(4.8, &limits), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(4.81, &limits), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(5.0, &limits), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(5.01, &limits), RiskLevel::High);
    }

    #[test]
    fn test_projection_is_ordered_and_growing() {
        let segments = vec![NetworkSegment::new("s1", "", Meters(120.0), "cal-35")
            .with_clients(ClientCounts::single_phase(12))];

        let scenario = GrowthScenario::starting(2030).with_years(4);
        let points = run_sensitivity(
            &VoltageDropSolver::new(),
            &segments,
            ReferenceCatalog::builtin(),
            &scenario,
        )
        .unwrap();

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].year, 2030);
        assert_eq!(points[4].year, 2034);
        assert_eq!(points[0].load_factor, 1.0);
        assert_eq!(points[4].load_factor, 1.12);
        for pair in points.windows(2) {
            assert!(pair[1].max_drop_pct >= pair[0].max_drop_pct);
        }
    }

    #[test]
    fn test_rejects_non_finite_growth() {
        let scenario = GrowthScenario::default().with_growth_rate(f64::NAN);
        let err = run_sensitivity(
            &VoltageDropSolver::new(),
            &[],
            ReferenceCatalog::builtin(),
            &scenario,
        )
        .unwrap_err();
        assert!(matches!(err, LvError::Validation(_)));
    }

    #[test]
    fn test_rejects_horizon_past_year_range() {
        let segments = vec![NetworkSegment::new("s1", "", Meters(10.0), "cal-70")];
        for scenario in [
            GrowthScenario::starting(i32::MAX).with_years(1),
            GrowthScenario::starting(2024).with_years(u32::MAX),
        ] {
            let err = run_sensitivity(
                &VoltageDropSolver::new(),
                &segments,
                ReferenceCatalog::builtin(),
                &scenario,
            )
            .unwrap_err();
            assert!(matches!(err, LvError::Validation(_)), "{:?}", scenario);
        }

        assert_eq!(GrowthScenario::starting(i32::MAX).year(0), Some(i32::MAX));
        assert_eq!(GrowthScenario::starting(2024).year(u32::MAX), None);
    }

    #[test]
    fn test_rejects_shrinking_to_zero_load() {
        let segments = vec![NetworkSegment::new("s1", "", Meters(10.0), "cal-70")];
        let scenario = GrowthScenario::default().with_growth_rate(-0.1);
        let err = run_sensitivity(
            &VoltageDropSolver::new(),
            &segments,
            ReferenceCatalog::builtin(),
            &scenario,
        )
        .unwrap_err();
        match err {
            LvError::Validation(message) => assert!(message.contains("growth rate")),
            other => panic!("unexpected error {:?}", other),
        }

        // A mild decline stays positive over the horizon
        let declining = GrowthScenario::default().with_growth_rate(-0.05);
        let points = run_sensitivity(
            &VoltageDropSolver::new(),
            &segments,
            ReferenceCatalog::builtin(),
            &declining,
        )
        .unwrap();
        assert_eq!(points.last().unwrap().load_factor, 0.5);
    }
}
