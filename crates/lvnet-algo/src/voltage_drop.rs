//! Cumulative voltage drop along a radial low-voltage feeder.
//!
//! The feeder is an ordered list of [`NetworkSegment`]s, index 0 leaving the
//! distribution transformer. Each segment carries its own consumers (clients,
//! a dedicated point load, public lighting) plus everything downstream of it.
//!
//! ## Algorithm
//!
//! 1. **Demand**: clients × demand factor (distributed) and dedicated kVA plus
//!    lighting watts (point), both scaled by the load factor
//! 2. **Downstream accumulation**: walk from the far end towards the source
//! 3. **Forward pass**: per segment, line current, load moment and drop
//!    (moment × hectometres × drop coefficient), the running drop, and the
//!    short-circuit current from the accumulated source + line impedance
//! 4. **Suggestions**: the cheapest conductor with more ampacity than the
//!    segment current and a lower drop coefficient, for every segment that
//!    violates a limit or uses more than the preventive share of the drop limit
//!
//! Distributed load is modeled as concentrated at mid-span, which is why its
//! contribution to the moment is halved.
//!
//! Every intermediate value keeps full precision; rounding happens only when a
//! [`SegmentResult`] is built.

use lvnet_core::{
    round_to, Amperes, Conductor, ConductorId, DemandClass, KiloVoltAmperes, Kiloamperes,
    LvError, LvResult, Meters, NetworkSegment, Ohms, ReferenceCatalog, SegmentId, Volts,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Compliance state of one segment; voltage violations take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    Ok,
    VoltageViolation,
    ConductorOverload,
}

impl SegmentStatus {
    /// Report label used on drawings and field reports
    pub fn message(self) -> &'static str {
        match self {
            SegmentStatus::Ok => "OK",
            SegmentStatus::VoltageViolation => "Violação QT",
            SegmentStatus::ConductorOverload => "Sobrecarga Condutor",
        }
    }
}

/// Per-segment outcome of the forward pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub segment_id: SegmentId,
    pub segment_name: String,
    pub total_clients: u32,
    /// Demand of this segment's own clients
    pub distributed_kva: KiloVoltAmperes,
    /// Dedicated load plus public lighting on this segment
    pub point_kva: KiloVoltAmperes,
    /// Demand of every segment further from the source
    pub downstream_kva: KiloVoltAmperes,
    /// Demand carried by this segment
    pub total_kva: KiloVoltAmperes,
    /// Equivalent load at the far end (kVA), multiplied by hectometres for the drop
    pub moment_kva: f64,
    pub voltage_drop: Volts,
    pub voltage_drop_pct: f64,
    pub cumulative_drop_pct: f64,
    pub voltage_at_end: Volts,
    pub current: Amperes,
    pub short_circuit: Kiloamperes,
    pub is_compliant: bool,
    pub status: SegmentStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionKind {
    CableUpgrade,
}

/// A conductor swap proposed for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub segment_id: SegmentId,
    pub kind: SuggestionKind,
    pub description: String,
    pub current_conductor: ConductorId,
    pub suggested_conductor: ConductorId,
    /// Reduction of this segment's own drop (%), one decimal
    pub improvement_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCalculationResult {
    pub segments: Vec<SegmentResult>,
    pub max_drop_pct: f64,
    pub total_length: Meters,
    /// Demand seen by the transformer
    pub total_demand_kva: KiloVoltAmperes,
    pub transformer_occupancy_pct: f64,
    /// Smallest standard rating within the occupancy limit, set only when
    /// the installed transformer exceeds it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_transformer_kva: Option<KiloVoltAmperes>,
    pub demand_class: DemandClass,
    pub is_global_compliant: bool,
    pub suggestions: Vec<OptimizationSuggestion>,
}

impl NetworkCalculationResult {
    fn empty(demand_class: DemandClass) -> Self {
        Self {
            segments: Vec::new(),
            max_drop_pct: 0.0,
            total_length: Meters::ZERO,
            total_demand_kva: KiloVoltAmperes::ZERO,
            transformer_occupancy_pct: 0.0,
            recommended_transformer_kva: None,
            demand_class,
            is_global_compliant: true,
            suggestions: Vec::new(),
        }
    }

    /// Segments that violate a limit
    pub fn violations(&self) -> impl Iterator<Item = &SegmentResult> {
        self.segments.iter().filter(|s| !s.is_compliant)
    }
}

/// Voltage-drop solver configuration
#[derive(Debug, Clone)]
pub struct VoltageDropSolver {
    /// Transformer rating
    pub transformer_kva: KiloVoltAmperes,
    /// Demand-curve column
    pub demand_class: DemandClass,
    /// Nominal line-to-line voltage
    pub line_voltage: Volts,
    /// Phase-to-neutral voltage driving the short-circuit current
    pub phase_voltage: Volts,
    /// Transformer internal reactance (p.u. of its own base)
    pub transformer_reactance_pu: f64,
    /// Multiplier applied to every local demand
    pub load_factor: f64,
}

impl Default for VoltageDropSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl VoltageDropSolver {
    /// Create a solver for a 75 kVA transformer and class B consumers
    pub fn new() -> Self {
        Self {
            transformer_kva: KiloVoltAmperes(75.0),
            demand_class: DemandClass::B,
            line_voltage: Volts(220.0),
            phase_voltage: Volts(127.0),
            transformer_reactance_pu: 0.04,
            load_factor: 1.0,
        }
    }

    pub fn with_transformer_kva(mut self, kva: f64) -> Self {
        self.transformer_kva = KiloVoltAmperes(kva);
        self
    }

    pub fn with_demand_class(mut self, class: DemandClass) -> Self {
        self.demand_class = class;
        self
    }

    /// Set nominal line and phase voltages
    pub fn with_voltages(mut self, line: f64, phase: f64) -> Self {
        self.line_voltage = Volts(line);
        self.phase_voltage = Volts(phase);
        self
    }

    pub fn with_transformer_reactance(mut self, reactance_pu: f64) -> Self {
        self.transformer_reactance_pu = reactance_pu;
        self
    }

    /// Scale all local demand, e.g. for load-growth projections
    pub fn with_load_factor(mut self, factor: f64) -> Self {
        self.load_factor = factor;
        self
    }

    /// Transformer base impedance: (kV)² × 1000 / kVA
    fn base_impedance(&self) -> Ohms {
        let kv = self.line_voltage.value() / 1000.0;
        Ohms(kv * kv * 1000.0 / self.transformer_kva.value())
    }

    fn check_settings(&self) -> LvResult<()> {
        if !(self.transformer_kva.is_finite() && self.transformer_kva.value() > 0.0) {
            return Err(LvError::validation(format!(
                "transformer rating must be positive (got {})",
                self.transformer_kva.value()
            )));
        }
        if !(self.load_factor.is_finite() && self.load_factor > 0.0) {
            return Err(LvError::validation(format!(
                "load factor must be positive (got {})",
                self.load_factor
            )));
        }
        if !(self.line_voltage.value() > 0.0 && self.phase_voltage.value() > 0.0) {
            return Err(LvError::validation("nominal voltages must be positive"));
        }
        Ok(())
    }

    /// Demand and conductor of one segment, before any accumulation
    fn local_load<'c>(
        &self,
        segment: &NetworkSegment,
        catalog: &'c ReferenceCatalog,
    ) -> LvResult<LocalLoad<'c>> {
        if !(segment.length.is_finite() && segment.length.value() >= 0.0) {
            return Err(LvError::validation(format!(
                "segment '{}' has invalid length {}",
                segment.id,
                segment.length.value()
            )));
        }
        if !(segment.dedicated_kva.is_finite() && segment.dedicated_kva.value() >= 0.0) {
            return Err(LvError::validation(format!(
                "segment '{}' has invalid dedicated load {}",
                segment.id,
                segment.dedicated_kva.value()
            )));
        }

        let conductor = catalog.conductor(&segment.conductor)?;
        let lighting = if segment.lighting_quantity > 0 {
            let watts = catalog.lighting_watts(&segment.lighting)?;
            KiloVoltAmperes::from_watts(watts * f64::from(segment.lighting_quantity))
        } else {
            KiloVoltAmperes::ZERO
        };

        let clients = segment.clients.total().ok_or_else(|| {
            LvError::validation(format!("segment '{}' has too many clients", segment.id))
        })?;
        let factor = catalog.demand_factor(clients, self.demand_class);

        Ok(LocalLoad {
            clients,
            distributed: KiloVoltAmperes(f64::from(clients) * factor) * self.load_factor,
            point: (segment.dedicated_kva + lighting) * self.load_factor,
            conductor,
        })
    }

    /// Solve the feeder
    pub fn solve(
        &self,
        segments: &[NetworkSegment],
        catalog: &ReferenceCatalog,
    ) -> LvResult<NetworkCalculationResult> {
        self.check_settings()?;
        if segments.is_empty() {
            return Ok(NetworkCalculationResult::empty(self.demand_class));
        }

        let limits = &catalog.limits;
        let loads = segments
            .iter()
            .map(|segment| self.local_load(segment, catalog))
            .collect::<LvResult<Vec<_>>>()?;

        // Far end towards the source
        let mut downstream = vec![KiloVoltAmperes::ZERO; loads.len()];
        for i in (0..loads.len().saturating_sub(1)).rev() {
            downstream[i] = loads[i + 1].total() + downstream[i + 1];
        }

        let mut running_drop = Volts::ZERO;
        let mut resistance = Ohms::ZERO;
        let mut reactance = self.base_impedance() * self.transformer_reactance_pu;
        let mut total_length = Meters::ZERO;
        let mut results = Vec::with_capacity(segments.len());
        let mut suggestions = Vec::new();

        for (i, (segment, load)) in segments.iter().zip(&loads).enumerate() {
            let conductor = load.conductor;
            let segment_kva = load.total() + downstream[i];
            let current = segment_kva.three_phase_current(self.line_voltage);

            let moment = load.distributed / 2.0 + load.point + downstream[i];
            let hectometres = segment.length / limits.length_divisor;
            let drop = Volts(moment.value() * hectometres * conductor.drop_coefficient);
            running_drop += drop;
            let cumulative_pct = running_drop.percent_of(self.line_voltage);

            resistance += conductor.resistance_over(segment.length);
            reactance += conductor.reactance_over(segment.length);
            let short_circuit =
                (self.phase_voltage / Ohms::magnitude(resistance, reactance)).to_kiloamperes();

            total_length += segment.length;

            let voltage_violation = cumulative_pct > limits.max_voltage_drop_pct;
            let overload = current > conductor.ampacity;
            let status = if voltage_violation {
                SegmentStatus::VoltageViolation
            } else if overload {
                SegmentStatus::ConductorOverload
            } else {
                SegmentStatus::Ok
            };
            let is_compliant = status == SegmentStatus::Ok;

            debug!(
                segment = %segment.id,
                kva = segment_kva.value(),
                current = current.value(),
                drop_v = drop.value(),
                cumulative_pct,
                ?status,
                "feeder segment"
            );

            if !is_compliant || cumulative_pct > limits.preventive_drop_pct() {
                if let Some(upgrade) = cheapest_upgrade(catalog, conductor, current) {
                    let new_drop = moment.value() * hectometres * upgrade.drop_coefficient;
                    let improvement = if drop.value() > 0.0 {
                        (drop.value() - new_drop) / drop.value() * 100.0
                    } else {
                        0.0
                    };
                    let description = if is_compliant {
                        "Otimização preventiva sugerida."
                    } else {
                        "Upgrade obrigatório para conformidade."
                    };
                    suggestions.push(OptimizationSuggestion {
                        segment_id: segment.id.clone(),
                        kind: SuggestionKind::CableUpgrade,
                        description: description.to_string(),
                        current_conductor: conductor.id.clone(),
                        suggested_conductor: upgrade.id.clone(),
                        improvement_pct: round_to(improvement, 1),
                    });
                }
            }

            results.push(SegmentResult {
                segment_id: segment.id.clone(),
                segment_name: segment.name.clone(),
                total_clients: load.clients,
                distributed_kva: load.distributed.rounded(2),
                point_kva: load.point.rounded(2),
                downstream_kva: downstream[i].rounded(2),
                total_kva: segment_kva.rounded(2),
                moment_kva: round_to(moment.value(), 2),
                voltage_drop: drop.rounded(2),
                voltage_drop_pct: round_to(drop.percent_of(self.line_voltage), 2),
                cumulative_drop_pct: round_to(cumulative_pct, 2),
                voltage_at_end: (self.line_voltage - running_drop).rounded(1),
                current: current.rounded(2),
                short_circuit: short_circuit.rounded(3),
                is_compliant,
                status,
                message: status.message().to_string(),
            });
        }

        let total_demand = loads[0].total() + downstream[0];
        let occupancy = total_demand / self.transformer_kva * 100.0;
        let overloaded_transformer = occupancy > limits.max_occupancy_pct;
        let recommended_transformer = if overloaded_transformer {
            let rating = catalog.smallest_transformer_for(total_demand.value());
            if rating.is_none() {
                warn!(
                    demand_kva = round_to(total_demand.value(), 2),
                    "no standard transformer rating carries the feeder demand"
                );
            }
            rating.map(KiloVoltAmperes)
        } else {
            None
        };
        let is_global_compliant =
            !overloaded_transformer && results.iter().all(|r| r.is_compliant);
        let max_drop_pct = running_drop.percent_of(self.line_voltage);

        debug!(
            segments = results.len(),
            max_drop_pct,
            occupancy,
            suggestions = suggestions.len(),
            "feeder solved"
        );
        if !is_global_compliant {
            warn!(
                max_drop_pct = round_to(max_drop_pct, 2),
                occupancy = round_to(occupancy, 1),
                violations = results.iter().filter(|r| !r.is_compliant).count(),
                "feeder is not compliant"
            );
        }

        Ok(NetworkCalculationResult {
            segments: results,
            max_drop_pct: round_to(max_drop_pct, 2),
            total_length: total_length.rounded(2),
            total_demand_kva: total_demand.rounded(2),
            transformer_occupancy_pct: round_to(occupancy, 1),
            recommended_transformer_kva: recommended_transformer,
            demand_class: self.demand_class,
            is_global_compliant,
            suggestions,
        })
    }
}

struct LocalLoad<'c> {
    clients: u32,
    distributed: KiloVoltAmperes,
    point: KiloVoltAmperes,
    conductor: &'c Conductor,
}

impl LocalLoad<'_> {
    fn total(&self) -> KiloVoltAmperes {
        self.distributed + self.point
    }
}

/// Cheapest conductor that carries `current` with a lower drop coefficient.
fn cheapest_upgrade<'c>(
    catalog: &'c ReferenceCatalog,
    installed: &Conductor,
    current: Amperes,
) -> Option<&'c Conductor> {
    catalog
        .conductors
        .iter()
        .filter(|c| {
            c.id != installed.id
                && c.ampacity > current
                && c.drop_coefficient < installed.drop_coefficient
        })
        .min_by(|a, b| a.price_per_km.total_cmp(&b.price_per_km))
}

/// Solve a feeder with default voltages and no load growth.
pub fn calculate_network(
    segments: &[NetworkSegment],
    transformer_kva: f64,
    demand_class: DemandClass,
    catalog: &ReferenceCatalog,
) -> LvResult<NetworkCalculationResult> {
    VoltageDropSolver::new()
        .with_transformer_kva(transformer_kva)
        .with_demand_class(demand_class)
        .solve(segments, catalog)
}
