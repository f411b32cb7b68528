//! Horizontal force balance at the top of a pole.
//!
//! Each attached span pulls the pole along its horizontal direction with the
//! tension of its conductors. Tensions follow the conductor's linear model
//! `rate × real span + base`, evaluated on the 3-D span (horizontal length and
//! height difference). The resultant of all pulls is compared with the pole's
//! nominal load.

use lvnet_core::{
    real_span_length, round_to, DecaNewtons, Degrees, LvError, LvResult, MechanicalInputItem,
    Meters, PoleId, Radians, ReferenceCatalog,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Share of a phase conductor's tension carried by the neutral messenger
pub const NEUTRAL_TENSION_FACTOR: f64 = 0.7;

/// Forces contributed by one cable span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableCalculationDetail {
    /// Position in the input list, `c-0`, `c-1`, ...
    pub id: String,
    /// Conductor display name
    pub label: String,
    pub phase_tension: DecaNewtons,
    pub neutral_tension: DecaNewtons,
    pub fx: DecaNewtons,
    pub fy: DecaNewtons,
    pub angle: Degrees,
    pub real_span: Meters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicalCalcResult {
    /// Set when the nominal load came from the pole catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pole_id: Option<PoleId>,
    pub resultant: DecaNewtons,
    /// Direction of the resultant, [0, 360)
    pub resultant_angle: Degrees,
    pub nominal_resistance: DecaNewtons,
    pub usage_pct: f64,
    pub is_compliant: bool,
    pub fx_total: DecaNewtons,
    pub fy_total: DecaNewtons,
    pub cables: Vec<CableCalculationDetail>,
}

/// Pole stress solver configuration
#[derive(Debug, Clone)]
pub struct PoleStressSolver {
    /// Neutral tension as a fraction of one phase conductor's tension
    pub neutral_factor: f64,
}

impl Default for PoleStressSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PoleStressSolver {
    pub fn new() -> Self {
        Self {
            neutral_factor: NEUTRAL_TENSION_FACTOR,
        }
    }

    pub fn with_neutral_factor(mut self, factor: f64) -> Self {
        self.neutral_factor = factor;
        self
    }

    fn check_cable(index: usize, cable: &MechanicalInputItem) -> LvResult<()> {
        if !(cable.span.is_finite() && cable.span.value() >= 0.0) {
            return Err(LvError::validation(format!(
                "cable c-{} has invalid span {}",
                index,
                cable.span.value()
            )));
        }
        if !cable.height_diff.is_finite() || !cable.angle.is_finite() {
            return Err(LvError::validation(format!(
                "cable c-{} has a non-finite height difference or angle",
                index
            )));
        }
        Ok(())
    }

    /// Balance the forces of `cables` against a pole rated `nominal_resistance` daN
    pub fn solve(
        &self,
        nominal_resistance: f64,
        cables: &[MechanicalInputItem],
        catalog: &ReferenceCatalog,
    ) -> LvResult<MechanicalCalcResult> {
        if !(nominal_resistance.is_finite() && nominal_resistance > 0.0) {
            return Err(LvError::validation(format!(
                "nominal pole resistance must be positive (got {})",
                nominal_resistance
            )));
        }
        if !(self.neutral_factor.is_finite() && self.neutral_factor >= 0.0) {
            return Err(LvError::validation("neutral factor must be non-negative"));
        }

        let mut fx_total = DecaNewtons::ZERO;
        let mut fy_total = DecaNewtons::ZERO;
        let mut details = Vec::with_capacity(cables.len());

        for (index, cable) in cables.iter().enumerate() {
            Self::check_cable(index, cable)?;
            let conductor = catalog.conductor(&cable.conductor)?;

            let real_span = real_span_length(cable.span, cable.height_diff.abs());
            let unit = conductor.stress.unit_tension(real_span);
            let phase = unit * f64::from(cable.quantity);
            let neutral = if cable.has_neutral {
                unit * self.neutral_factor
            } else {
                DecaNewtons::ZERO
            };
            let tension = phase + neutral;

            let direction = cable.angle.to_radians();
            let fx = tension * direction.cos();
            let fy = tension * direction.sin();
            fx_total += fx;
            fy_total += fy;

            debug!(
                cable = index,
                conductor = %conductor.id,
                real_span = real_span.value(),
                tension = tension.value(),
                "pole cable"
            );

            details.push(CableCalculationDetail {
                id: format!("c-{}", index),
                label: conductor.name.clone(),
                phase_tension: phase.rounded(2),
                neutral_tension: neutral.rounded(2),
                fx: fx.rounded(2),
                fy: fy.rounded(2),
                angle: cable.angle,
                real_span: real_span.rounded(2),
            });
        }

        let resultant = DecaNewtons(fx_total.value().hypot(fy_total.value()));
        let angle = Radians::atan2(fy_total.value(), fx_total.value())
            .to_degrees()
            .normalized();
        let usage = resultant.value() / nominal_resistance * 100.0;
        let is_compliant = resultant.value() <= nominal_resistance;

        debug!(
            cables = details.len(),
            resultant = resultant.value(),
            usage,
            "pole balance"
        );
        if !is_compliant {
            warn!(
                resultant = round_to(resultant.value(), 2),
                nominal = nominal_resistance,
                "pole is overloaded"
            );
        }

        Ok(MechanicalCalcResult {
            pole_id: None,
            resultant: resultant.rounded(2),
            resultant_angle: angle.rounded(2),
            nominal_resistance: DecaNewtons(nominal_resistance),
            usage_pct: round_to(usage, 1),
            is_compliant,
            fx_total: fx_total.rounded(2),
            fy_total: fy_total.rounded(2),
            cables: details,
        })
    }

    /// Same as [`solve`](Self::solve), with the nominal load of a catalog pole
    pub fn solve_for_pole(
        &self,
        pole: &PoleId,
        cables: &[MechanicalInputItem],
        catalog: &ReferenceCatalog,
    ) -> LvResult<MechanicalCalcResult> {
        let nominal = catalog.pole(pole)?.nominal_load;
        let mut result = self.solve(nominal.value(), cables, catalog)?;
        result.pole_id = Some(pole.clone());
        Ok(result)
    }
}

/// Pole balance with the standard neutral factor.
pub fn calculate_pole_stress(
    nominal_resistance: f64,
    cables: &[MechanicalInputItem],
    catalog: &ReferenceCatalog,
) -> LvResult<MechanicalCalcResult> {
    PoleStressSolver::new().solve(nominal_resistance, cables, catalog)
}

/// Pole balance against the nominal load of a catalog pole.
pub fn calculate_pole_stress_for(
    pole: &PoleId,
    cables: &[MechanicalInputItem],
    catalog: &ReferenceCatalog,
) -> LvResult<MechanicalCalcResult> {
    PoleStressSolver::new().solve_for_pole(pole, cables, catalog)
}
