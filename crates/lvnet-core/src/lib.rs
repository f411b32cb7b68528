//! # lvnet-core: Low-Voltage Network Modeling Core
//!
//! Provides the data structures, reference tables and geometry helpers shared
//! by the low-voltage feeder and pole-stress engines.
//!
//! ## Design Philosophy
//!
//! A low-voltage study is modeled as plain values:
//! - **Segments**: an ordered list of [`NetworkSegment`]s, index 0 adjacent to
//!   the distribution transformer, forming one radial feeder path
//! - **Cables at a pole**: a list of [`MechanicalInputItem`]s, one per span
//!   leaving the pole
//! - **Reference data**: a [`ReferenceCatalog`] passed explicitly into every
//!   calculation (conductors, poles, demand curve, lighting fixtures, limits)
//!
//! Nothing is cached between calls; recalculating means calling the engine
//! again with new values.
//!
//! ## Quick Start
//!
//! ```rust
//! use lvnet_core::*;
//!
//! let catalog = ReferenceCatalog::builtin();
//!
//! let segment = NetworkSegment::new("s1", "PT-01 → PT-02", Meters(40.0), "cal-70")
//!     .with_clients(ClientCounts::single_phase(5))
//!     .with_lighting("IP 100W", 1);
//!
//! let conductor = catalog.conductor(&segment.conductor).unwrap();
//! assert_eq!(conductor.section_mm2, 70.0);
//! assert_eq!(catalog.demand_factor(segment.clients.total().unwrap(), DemandClass::B), 2.5);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Reference tables and normative limits
//! - [`diagnostics`] - Validation and diagnostic reporting
//! - [`error`] - [`LvError`] and [`LvResult`]
//! - [`geo`] - Span lengths, haversine distance, polygon area
//! - [`units`] - Typed physical quantities

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod catalog;
pub mod diagnostics;
pub mod error;
pub mod geo;
pub mod units;

pub use catalog::{NormativeLimits, ReferenceCatalog};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{CatalogKind, LvError, LvResult};
pub use geo::{
    great_circle_distance, haversine_distance, polygon_area, real_span_length, span_metrics,
    GeoPoint, SpanMetrics,
};
pub use units::{
    round_to, Amperes, DecaNewtons, Degrees, KiloVoltAmperes, Kiloamperes, Meters, Ohms,
    Radians, Volts,
};

// Newtype wrappers for catalog and segment keys
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[inline]
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Catalog key of a conductor (e.g. `cal-70`)
    ConductorId
);
string_id!(
    /// Catalog key of a pole type (e.g. `p-600`)
    PoleId
);
string_id!(
    /// Identifier of a feeder segment, unique within one study
    SegmentId
);

// =============================================================================
// Catalog entries
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConductorMaterial {
    Aluminum,
    Copper,
}

impl fmt::Display for ConductorMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConductorMaterial::Aluminum => f.write_str("Al"),
            ConductorMaterial::Copper => f.write_str("Cu"),
        }
    }
}

/// Linear tension model of a conductor: `T = rate × span + base`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressParams {
    /// daN per metre of real span
    pub rate: f64,
    /// Tension at zero span
    pub base: DecaNewtons,
}

impl StressParams {
    /// Tension of one conductor over a real (3-D) span
    #[inline]
    pub fn unit_tension(&self, real_span: Meters) -> DecaNewtons {
        DecaNewtons(self.rate * real_span.value()) + self.base
    }
}

/// Conductor catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conductor {
    pub id: ConductorId,
    pub name: String,
    pub material: ConductorMaterial,
    /// Phase cross-section (mm²)
    pub section_mm2: f64,
    /// Voltage drop in volts per kVA·hm
    pub drop_coefficient: f64,
    /// Series resistance (Ω/km)
    pub resistance_ohm_per_km: f64,
    /// Series reactance (Ω/km)
    pub reactance_ohm_per_km: f64,
    /// Unit weight (kg/km)
    pub weight_kg_per_km: f64,
    /// Rated breaking load
    pub breaking_load: DecaNewtons,
    /// Continuous current rating
    pub ampacity: Amperes,
    /// Installed price per km
    pub price_per_km: f64,
    pub stress: StressParams,
}

impl Conductor {
    /// Series resistance of `length` of this conductor
    pub fn resistance_over(&self, length: Meters) -> Ohms {
        Ohms(self.resistance_ohm_per_km * length.to_kilometers())
    }

    /// Series reactance of `length` of this conductor
    pub fn reactance_over(&self, length: Meters) -> Ohms {
        Ohms(self.reactance_ohm_per_km * length.to_kilometers())
    }
}

/// Pole catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pole {
    pub id: PoleId,
    pub label: String,
    pub height: Meters,
    /// Nominal horizontal load the pole is rated for at the top
    pub nominal_load: DecaNewtons,
}

// =============================================================================
// Demand
// =============================================================================

/// Consumer load class; selects a column of the demand curve.
///
/// Unrecognized class names degrade to [`DemandClass::B`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum DemandClass {
    A,
    #[default]
    B,
    C,
    D,
}

impl DemandClass {
    pub const ALL: [DemandClass; 4] = [DemandClass::A, DemandClass::B, DemandClass::C, DemandClass::D];

    /// Parse a class name, falling back to B for anything unrecognized
    pub fn parse_lenient(value: &str) -> DemandClass {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => DemandClass::A,
            "B" => DemandClass::B,
            "C" => DemandClass::C,
            "D" => DemandClass::D,
            _ => DemandClass::B,
        }
    }

    /// Column index into a demand bracket's factors
    #[inline]
    pub fn column(self) -> usize {
        match self {
            DemandClass::A => 0,
            DemandClass::B => 1,
            DemandClass::C => 2,
            DemandClass::D => 3,
        }
    }
}

impl From<String> for DemandClass {
    fn from(value: String) -> Self {
        DemandClass::parse_lenient(&value)
    }
}

impl std::str::FromStr for DemandClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DemandClass::parse_lenient(s))
    }
}

impl fmt::Display for DemandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DemandClass::A => "A",
            DemandClass::B => "B",
            DemandClass::C => "C",
            DemandClass::D => "D",
        };
        f.write_str(name)
    }
}

/// One row of the demand curve: kVA per client for a client-count bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandBracket {
    pub min: u32,
    pub max: u32,
    /// Factors for classes A, B, C, D (kVA per client)
    pub factors: [f64; 4],
}

impl DemandBracket {
    #[inline]
    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && count <= self.max
    }

    #[inline]
    pub fn factor(&self, class: DemandClass) -> f64 {
        self.factors[class.column()]
    }
}

/// Client counts of a segment by connection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientCounts {
    pub single_phase: u32,
    pub two_phase: u32,
    pub three_phase: u32,
    pub three_phase_special: u32,
}

impl ClientCounts {
    pub fn single_phase(count: u32) -> Self {
        Self {
            single_phase: count,
            ..Self::default()
        }
    }

    /// Sum of all connection types; `None` if it does not fit in a `u32`
    pub fn total(&self) -> Option<u32> {
        self.single_phase
            .checked_add(self.two_phase)?
            .checked_add(self.three_phase)?
            .checked_add(self.three_phase_special)
    }
}

// =============================================================================
// Study inputs
// =============================================================================

/// Lighting key meaning "no public lighting on this segment"
pub const NO_LIGHTING: &str = "Sem IP";

fn no_lighting() -> String {
    NO_LIGHTING.to_string()
}

/// One span of the radial feeder, in order from the transformer outwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSegment {
    pub id: SegmentId,
    #[serde(default)]
    pub name: String,
    /// Horizontal length
    pub length: Meters,
    #[serde(default)]
    pub clients: ClientCounts,
    /// Point load connected at this segment (kVA)
    #[serde(default)]
    pub dedicated_kva: KiloVoltAmperes,
    /// Public-lighting fixture key
    #[serde(default = "no_lighting")]
    pub lighting: String,
    #[serde(default)]
    pub lighting_quantity: u32,
    pub conductor: ConductorId,
}

impl NetworkSegment {
    pub fn new(
        id: impl Into<SegmentId>,
        name: impl Into<String>,
        length: Meters,
        conductor: impl Into<ConductorId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            length,
            clients: ClientCounts::default(),
            dedicated_kva: KiloVoltAmperes::ZERO,
            lighting: no_lighting(),
            lighting_quantity: 0,
            conductor: conductor.into(),
        }
    }

    pub fn with_clients(mut self, clients: ClientCounts) -> Self {
        self.clients = clients;
        self
    }

    pub fn with_dedicated_kva(mut self, kva: f64) -> Self {
        self.dedicated_kva = KiloVoltAmperes(kva);
        self
    }

    pub fn with_lighting(mut self, fixture: impl Into<String>, quantity: u32) -> Self {
        self.lighting = fixture.into();
        self.lighting_quantity = quantity;
        self
    }

    pub fn with_conductor(mut self, conductor: impl Into<ConductorId>) -> Self {
        self.conductor = conductor.into();
        self
    }
}

fn default_phase_quantity() -> u32 {
    3
}

/// One cable span attached to a pole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicalInputItem {
    pub conductor: ConductorId,
    /// Horizontal span length
    pub span: Meters,
    /// Height differential to the far pole; only the magnitude is used
    #[serde(default)]
    pub height_diff: Meters,
    /// Horizontal direction of the span
    pub angle: Degrees,
    /// Number of phase conductors
    #[serde(default = "default_phase_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub has_neutral: bool,
}

impl MechanicalInputItem {
    pub fn new(conductor: impl Into<ConductorId>, span: Meters, angle: Degrees) -> Self {
        Self {
            conductor: conductor.into(),
            span,
            height_diff: Meters::ZERO,
            angle,
            quantity: default_phase_quantity(),
            has_neutral: false,
        }
    }

    pub fn with_height_diff(mut self, height_diff: Meters) -> Self {
        self.height_diff = height_diff;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_neutral(mut self, has_neutral: bool) -> Self {
        self.has_neutral = has_neutral;
        self
    }
}
