//! # lvnet-algo: Engineering Calculations for Low-Voltage Networks
//!
//! Two independent engines, each a pure function of its inputs and a
//! [`ReferenceCatalog`](lvnet_core::ReferenceCatalog):
//!
//! | Engine | Entry points | Question answered |
//! |--------|--------------|-------------------|
//! | Feeder voltage drop | [`VoltageDropSolver`], [`calculate_network`] | Does every segment stay within the drop limit and its ampacity? |
//! | Pole stress | [`PoleStressSolver`], [`calculate_pole_stress`], [`calculate_pole_stress_for`] | Does the resultant cable pull stay within the pole rating? |
//!
//! [`run_sensitivity`] projects the feeder engine over years of load growth;
//! with the `parallel` feature (default) the years are solved on the rayon
//! thread pool.
//!
//! Limit violations are reported in the results, never as errors. Errors are
//! reserved for unusable input: unknown catalog ids, negative lengths,
//! non-finite values.
//!
//! ## Example
//!
//! ```
//! use lvnet_algo::calculate_network;
//! use lvnet_core::{ClientCounts, DemandClass, Meters, NetworkSegment, ReferenceCatalog};
//!
//! let feeder = vec![
//!     NetworkSegment::new("s1", "PT-01 → PT-02", Meters(40.0), "cal-70")
//!         .with_clients(ClientCounts::single_phase(5)),
//!     NetworkSegment::new("s2", "PT-02 → PT-03", Meters(35.0), "cal-70")
//!         .with_clients(ClientCounts::single_phase(7))
//!         .with_dedicated_kva(2.5),
//! ];
//!
//! let result = calculate_network(&feeder, 75.0, DemandClass::B, ReferenceCatalog::builtin())?;
//! assert!(result.is_global_compliant);
//! println!("max drop: {:.2} %", result.max_drop_pct);
//! # Ok::<(), lvnet_core::LvError>(())
//! ```

pub mod mechanical;
pub mod sensitivity;
pub mod voltage_drop;

pub use mechanical::{
    calculate_pole_stress, calculate_pole_stress_for, CableCalculationDetail,
    MechanicalCalcResult, PoleStressSolver, NEUTRAL_TENSION_FACTOR,
};
pub use sensitivity::{run_sensitivity, GrowthScenario, RiskLevel, SensitivityPoint};
pub use voltage_drop::{
    calculate_network, NetworkCalculationResult, OptimizationSuggestion, SegmentResult,
    SegmentStatus, SuggestionKind, VoltageDropSolver,
};
