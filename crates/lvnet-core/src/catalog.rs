//! Reference tables used by the engines.
//!
//! A [`ReferenceCatalog`] is an immutable value: conductors, poles, the demand
//! curve, public-lighting wattages, standard transformer ratings and the
//! normative limits. The built-in copy reproduces the utility's standard
//! tables; alternative catalogs are loaded from TOML or JSON.

use crate::diagnostics::Diagnostics;
use crate::error::{CatalogKind, LvError, LvResult};
use crate::units::{Amperes, DecaNewtons, Meters};
use crate::{
    Conductor, ConductorId, ConductorMaterial, DemandBracket, DemandClass, Pole, PoleId,
    StressParams,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

/// Compliance thresholds applied by the engines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormativeLimits {
    /// Maximum cumulative voltage drop (%)
    pub max_voltage_drop_pct: f64,
    /// Drop above which a feeder is considered at high risk (%)
    pub critical_voltage_drop_pct: f64,
    /// Maximum transformer occupancy (%)
    pub max_occupancy_pct: f64,
    /// Length unit of the drop coefficient (hectometre)
    pub length_divisor: Meters,
    /// Fraction of the max drop above which an upgrade is suggested preventively
    pub preventive_margin: f64,
}

impl Default for NormativeLimits {
    fn default() -> Self {
        Self {
            max_voltage_drop_pct: 6.0,
            critical_voltage_drop_pct: 5.0,
            max_occupancy_pct: 120.0,
            length_divisor: Meters(100.0),
            preventive_margin: 0.8,
        }
    }
}

impl NormativeLimits {
    /// Drop (%) above which an upgrade is suggested even for compliant segments
    pub fn preventive_drop_pct(&self) -> f64 {
        self.max_voltage_drop_pct * self.preventive_margin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    /// Standard distribution transformer ratings (kVA)
    pub transformer_ratings_kva: Vec<f64>,
    #[serde(default)]
    pub limits: NormativeLimits,
    pub conductors: Vec<Conductor>,
    pub poles: Vec<Pole>,
    pub demand_curve: Vec<DemandBracket>,
    /// Fixture key → lamp power (W)
    pub public_lighting: BTreeMap<String, f64>,
}

static BUILTIN: Lazy<ReferenceCatalog> = Lazy::new(ReferenceCatalog::standard);

#[allow(clippy::too_many_arguments)]
fn conductor(
    material: ConductorMaterial,
    id: &str,
    name: &str,
    section: f64,
    drop: f64,
    r: f64,
    x: f64,
    weight: f64,
    breaking: f64,
    ampacity: f64,
    price: f64,
    stress: (f64, f64),
) -> Conductor {
    Conductor {
        id: ConductorId::from(id),
        name: name.to_string(),
        material,
        section_mm2: section,
        drop_coefficient: drop,
        resistance_ohm_per_km: r,
        reactance_ohm_per_km: x,
        weight_kg_per_km: weight,
        breaking_load: DecaNewtons(breaking),
        ampacity: Amperes(ampacity),
        price_per_km: price,
        stress: StressParams {
            rate: stress.0,
            base: DecaNewtons(stress.1),
        },
    }
}

fn pole(id: &str, label: &str, height: f64, nominal: f64) -> Pole {
    Pole {
        id: PoleId::from(id),
        label: label.to_string(),
        height: Meters(height),
        nominal_load: DecaNewtons(nominal),
    }
}

impl ReferenceCatalog {
    /// Shared built-in catalog
    pub fn builtin() -> &'static ReferenceCatalog {
        &BUILTIN
    }

    fn standard() -> Self {
        use ConductorMaterial::{Aluminum, Copper};

        let conductors = vec![
            conductor(
                Aluminum,
                "cal-2x16", "2#16(25)mm² Al", 16.0, 0.7779, 1.91, 0.10, 135.0, 500.0, 75.0,
                2100.0, (0.8, 15.0),
            ),
            conductor(
                Aluminum,
                "cal-35", "3x35+54.6mm² Al", 35.0, 0.2416, 0.87, 0.09, 250.0, 800.0, 120.0,
                3800.0, (1.2, 25.0),
            ),
            conductor(
                Aluminum,
                "cal-50", "3x50+54.6mm² Al", 50.0, 0.1784, 0.64, 0.09, 340.0, 1200.0, 155.0,
                5200.0, (1.78, 30.0),
            ),
            conductor(
                Aluminum,
                "cal-70", "3x70+54.6mm² Al", 70.0, 0.1248, 0.44, 0.08, 450.0, 1600.0, 195.0,
                6900.0, (2.1, 40.0),
            ),
            conductor(
                Aluminum,
                "cal-95", "3x95+54.6mm² Al", 95.0, 0.0891, 0.32, 0.08, 600.0, 2100.0, 240.0,
                8800.0, (2.8, 50.0),
            ),
            conductor(
                Aluminum,
                "cal-150", "3x150+70mm² Al", 150.0, 0.0573, 0.21, 0.08, 950.0, 3200.0, 315.0,
                12500.0, (3.5, 60.0),
            ),
            conductor(
                Aluminum,
                "caa-1/0", "1/0 CAA (MT)", 50.0, 0.089, 0.54, 0.10, 300.0, 2100.0, 220.0,
                9500.0, (4.2, 80.0),
            ),
            conductor(
                Copper, "cu-6", "1#6 (6) CU", 6.0, 1.68, 3.08, 0.12, 70.0, 250.0, 50.0, 16500.0,
                (0.5, 10.0),
            ),
        ];

        let poles = vec![
            pole("p-300", "Poste 300 daN", 9.0, 300.0),
            pole("p-600", "Poste 600 daN", 11.0, 600.0),
            pole("p-1000", "Poste 1000 daN", 11.0, 1000.0),
        ];

        let demand_curve = vec![
            DemandBracket { min: 1, max: 5, factors: [1.5, 2.5, 4.0, 6.0] },
            DemandBracket { min: 6, max: 10, factors: [1.2, 2.0, 3.2, 5.0] },
            DemandBracket { min: 11, max: 20, factors: [1.0, 1.6, 2.5, 4.0] },
            DemandBracket { min: 21, max: 50, factors: [0.8, 1.2, 2.0, 3.0] },
            DemandBracket { min: 51, max: 9999, factors: [0.5, 0.8, 1.3, 2.0] },
        ];

        let public_lighting = [
            ("Sem IP", 0.0),
            ("IP 70W", 70.0),
            ("IP 80W", 80.0),
            ("IP 100W", 100.0),
            ("IP 150W", 150.0),
            ("IP 250W", 250.0),
            ("IP 400W", 400.0),
        ]
        .into_iter()
        .map(|(key, watts)| (key.to_string(), watts))
        .collect();

        Self {
            transformer_ratings_kva: vec![15.0, 30.0, 45.0, 75.0, 112.5, 150.0, 225.0, 300.0],
            limits: NormativeLimits::default(),
            conductors,
            poles,
            demand_curve,
            public_lighting,
        }
    }

    pub fn conductor(&self, id: &ConductorId) -> LvResult<&Conductor> {
        self.conductors
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| LvError::unknown(CatalogKind::Conductor, id.as_str()))
    }

    pub fn pole(&self, id: &PoleId) -> LvResult<&Pole> {
        self.poles
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| LvError::unknown(CatalogKind::Pole, id.as_str()))
    }

    /// Lamp power of a public-lighting fixture (W)
    pub fn lighting_watts(&self, fixture: &str) -> LvResult<f64> {
        self.public_lighting
            .get(fixture)
            .copied()
            .ok_or_else(|| LvError::unknown(CatalogKind::Lighting, fixture))
    }

    /// Demand factor (kVA per client) for a client count.
    ///
    /// Counts beyond every bracket use the last bracket; zero clients give zero.
    pub fn demand_factor(&self, clients: u32, class: DemandClass) -> f64 {
        if clients == 0 {
            return 0.0;
        }
        self.demand_curve
            .iter()
            .find(|bracket| bracket.contains(clients))
            .or_else(|| self.demand_curve.last())
            .map(|bracket| bracket.factor(class))
            .unwrap_or(0.0)
    }

    /// Smallest standard transformer rating that carries `demand_kva` within
    /// the occupancy limit
    pub fn smallest_transformer_for(&self, demand_kva: f64) -> Option<f64> {
        let required = demand_kva * 100.0 / self.limits.max_occupancy_pct;
        self.transformer_ratings_kva
            .iter()
            .copied()
            .filter(|rating| *rating >= required)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Check table invariants, collecting every issue found.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        if self.conductors.is_empty() {
            diag.add_error("structure", "Catalog has no conductors");
        }
        if self.demand_curve.is_empty() {
            diag.add_error("structure", "Catalog has no demand curve");
        }
        if self.transformer_ratings_kva.is_empty() {
            diag.add_warning("structure", "Catalog lists no standard transformer ratings");
        }

        let mut seen = HashSet::new();
        for conductor in &self.conductors {
            let entity = format!("conductor {}", conductor.id);
            if !seen.insert(conductor.id.as_str()) {
                diag.add_error_with_entity("reference", "Duplicate conductor id", &entity);
            }
            let positive = [
                ("drop coefficient", conductor.drop_coefficient),
                ("resistance", conductor.resistance_ohm_per_km),
                ("reactance", conductor.reactance_ohm_per_km),
                ("ampacity", conductor.ampacity.value()),
            ];
            for (field, value) in positive {
                if !(value.is_finite() && value > 0.0) {
                    diag.add_error_with_entity(
                        "invariant",
                        &format!("{} must be positive (got {})", field, value),
                        &entity,
                    );
                }
            }
            if conductor.stress.rate < 0.0 || conductor.stress.base.value() < 0.0 {
                diag.add_warning_with_entity(
                    "invariant",
                    "Negative stress parameters produce compressive tension",
                    &entity,
                );
            }
        }

        let mut seen = HashSet::new();
        for pole in &self.poles {
            let entity = format!("pole {}", pole.id);
            if !seen.insert(pole.id.as_str()) {
                diag.add_error_with_entity("reference", "Duplicate pole id", &entity);
            }
            if !(pole.nominal_load.is_finite() && pole.nominal_load.value() > 0.0) {
                diag.add_error_with_entity("invariant", "nominal load must be positive", &entity);
            }
        }

        for (row, bracket) in self.demand_curve.iter().enumerate() {
            let entity = format!("demand row {}", row + 1);
            if bracket.min > bracket.max {
                diag.add_error_with_entity("table", "Bracket minimum exceeds maximum", &entity);
            }
            if bracket.factors.iter().any(|f| !f.is_finite() || *f < 0.0) {
                diag.add_error_with_entity("table", "Demand factors must be non-negative", &entity);
            }
            if let Some(next) = self.demand_curve.get(row + 1) {
                if next.min != bracket.max.saturating_add(1) {
                    diag.add_warning_with_entity(
                        "table",
                        &format!(
                            "Bracket does not continue at {} (next starts at {})",
                            bracket.max.saturating_add(1),
                            next.min
                        ),
                        &entity,
                    );
                }
            }
        }

        for (fixture, watts) in &self.public_lighting {
            if !watts.is_finite() || *watts < 0.0 {
                diag.add_error_with_entity(
                    "invariant",
                    "Lamp power must be non-negative",
                    &format!("lighting {}", fixture),
                );
            }
        }

        let limits = &self.limits;
        if limits.max_voltage_drop_pct <= 0.0 || limits.length_divisor.value() <= 0.0 {
            diag.add_error("limits", "Voltage-drop limit and length divisor must be positive");
        }
        if limits.critical_voltage_drop_pct > limits.max_voltage_drop_pct {
            diag.add_warning("limits", "Critical drop exceeds the maximum drop");
        }
    }

    pub fn validate(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();
        self.validate_into(&mut diag);
        diag
    }

    pub fn from_toml_str(content: &str) -> LvResult<Self> {
        let catalog: ReferenceCatalog = toml::from_str(content)?;
        catalog.validate().into_result()?;
        Ok(catalog)
    }

    pub fn from_json_str(content: &str) -> LvResult<Self> {
        let catalog: ReferenceCatalog = serde_json::from_str(content)?;
        catalog.validate().into_result()?;
        Ok(catalog)
    }

    /// Deserialize catalog text read from `path` without checking it.
    ///
    /// `.json` files are JSON; any other name (including no extension) is TOML.
    pub fn parse(path: &Path, content: &str) -> LvResult<Self> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }

    /// Read a catalog file with [`parse`](Self::parse) and reject it if
    /// validation finds errors.
    pub fn load(path: impl AsRef<Path>) -> LvResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::parse(path, &content)?;
        catalog.validate().into_result()?;
        info!(
            path = %path.display(),
            conductors = catalog.conductors.len(),
            poles = catalog.poles.len(),
            "loaded reference catalog"
        );
        Ok(catalog)
    }

    /// Serialize to TOML, e.g. as a starting point for a custom catalog
    pub fn to_toml_string(&self) -> LvResult<String> {
        toml::to_string_pretty(self).map_err(|e| LvError::Parse(e.to_string()))
    }
}

impl Default for ReferenceCatalog {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
