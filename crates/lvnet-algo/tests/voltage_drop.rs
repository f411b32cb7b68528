use lvnet_algo::{
    calculate_network, run_sensitivity, GrowthScenario, RiskLevel, SegmentStatus,
    VoltageDropSolver,
};
use lvnet_core::{
    Amperes, CatalogKind, ClientCounts, DemandClass, KiloVoltAmperes, Kiloamperes, LvError,
    Meters, NetworkSegment, ReferenceCatalog, Volts,
};

/// Three-span feeder whose 35 mm² tail feeds a 55 kVA consumer
fn reference_feeder() -> Vec<NetworkSegment> {
    vec![
        NetworkSegment::new("s1", "PT-01 → PT-02", Meters(40.0), "cal-70")
            .with_clients(ClientCounts::single_phase(5))
            .with_lighting("IP 100W", 1),
        NetworkSegment::new("s2", "PT-02 → PT-03", Meters(35.0), "cal-70")
            .with_clients(ClientCounts::single_phase(7))
            .with_dedicated_kva(2.5)
            .with_lighting("IP 100W", 1),
        NetworkSegment::new("s3", "PT-03 → PT-04", Meters(50.0), "cal-35")
            .with_clients(ClientCounts::single_phase(2))
            .with_dedicated_kva(55.0),
    ]
}

fn solve(segments: &[NetworkSegment]) -> lvnet_algo::NetworkCalculationResult {
    calculate_network(segments, 75.0, DemandClass::B, ReferenceCatalog::builtin()).unwrap()
}

#[test]
fn test_single_empty_segment() {
    let segments = vec![NetworkSegment::new("s1", "vazio", Meters(30.0), "cal-50")];
    let result = solve(&segments);

    let s = &result.segments[0];
    assert_eq!(s.total_clients, 0);
    assert_eq!(s.current, Amperes(0.0));
    assert_eq!(s.cumulative_drop_pct, 0.0);
    assert_eq!(s.voltage_at_end, Volts(220.0));
    assert!(s.is_compliant);
    assert_eq!(s.message, "OK");
    assert_eq!(result.max_drop_pct, 0.0);
    assert_eq!(result.total_length, Meters(30.0));
    assert!(result.is_global_compliant);
}

#[test]
fn test_empty_feeder() {
    let result = solve(&[]);
    assert!(result.segments.is_empty());
    assert!(result.suggestions.is_empty());
    assert_eq!(result.max_drop_pct, 0.0);
    assert_eq!(result.total_demand_kva, KiloVoltAmperes::ZERO);
    assert_eq!(result.transformer_occupancy_pct, 0.0);
    assert_eq!(result.demand_class, DemandClass::B);
    assert!(result.is_global_compliant);
}

#[test]
fn test_reference_feeder_segments() {
    let result = solve(&reference_feeder());
    let s = &result.segments;

    // Demand: 5 × 2.5 + 0.1, 7 × 2.0 + 2.5 + 0.1, 2 × 2.5 + 55
    assert_eq!(s[0].total_kva, KiloVoltAmperes(89.2));
    assert_eq!(s[1].total_kva, KiloVoltAmperes(76.6));
    assert_eq!(s[2].total_kva, KiloVoltAmperes(60.0));
    assert_eq!(s[0].downstream_kva, KiloVoltAmperes(76.6));
    assert_eq!(s[2].downstream_kva, KiloVoltAmperes(0.0));

    assert_eq!(s[0].current, Amperes(234.09));
    assert_eq!(s[1].current, Amperes(201.02));
    assert_eq!(s[2].current, Amperes(157.46));

    assert_eq!(s[0].moment_kva, 82.95);
    assert_eq!(s[0].voltage_drop, Volts(4.14));
    assert_eq!(s[1].voltage_drop, Volts(3.04));
    assert_eq!(s[2].voltage_drop, Volts(6.95));

    assert_eq!(s[0].cumulative_drop_pct, 1.88);
    assert_eq!(s[1].cumulative_drop_pct, 3.26);
    assert_eq!(s[2].cumulative_drop_pct, 6.42);
    assert_eq!(s[2].voltage_at_end, Volts(205.9));

    assert_eq!(s[0].short_circuit, Kiloamperes(3.743));
    assert_eq!(s[1].short_circuit, Kiloamperes(2.771));
    assert_eq!(s[2].short_circuit, Kiloamperes(1.5));

    // Cal-70 carries more than its 195 A on the first two spans
    assert_eq!(s[0].status, SegmentStatus::ConductorOverload);
    assert_eq!(s[1].status, SegmentStatus::ConductorOverload);
    assert_eq!(s[2].status, SegmentStatus::VoltageViolation);
    assert_eq!(s[2].message, "Violação QT");
}

#[test]
fn test_reference_feeder_summary_and_suggestions() {
    let result = solve(&reference_feeder());

    assert!(result.max_drop_pct > 5.2 && result.max_drop_pct < 6.7);
    assert_eq!(result.max_drop_pct, 6.42);
    assert_eq!(result.total_length, Meters(125.0));
    assert_eq!(result.total_demand_kva, KiloVoltAmperes(89.2));
    assert_eq!(result.transformer_occupancy_pct, 118.9);
    assert!(!result.is_global_compliant);
    assert_eq!(result.violations().count(), 3);

    let catalog = ReferenceCatalog::builtin();
    let tail = result
        .suggestions
        .iter()
        .find(|s| s.segment_id.as_str() == "s3")
        .unwrap();
    let current = catalog.conductor(&tail.current_conductor).unwrap();
    let suggested = catalog.conductor(&tail.suggested_conductor).unwrap();

    assert_eq!(tail.suggested_conductor.as_str(), "cal-70");
    assert!(suggested.ampacity > Amperes(157.5));
    assert!(suggested.drop_coefficient < current.drop_coefficient);
    assert_eq!(tail.improvement_pct, 48.3);
    assert_eq!(tail.description, "Upgrade obrigatório para conformidade.");

    let upstream: Vec<_> = result
        .suggestions
        .iter()
        .filter(|s| s.segment_id.as_str() != "s3")
        .map(|s| s.suggested_conductor.as_str())
        .collect();
    assert_eq!(upstream, vec!["cal-95", "cal-95"]);
}

#[test]
fn test_preventive_suggestion_when_close_to_limit() {
    // Compliant, but above 80 % of the drop limit
    let segments = vec![NetworkSegment::new("s1", "", Meters(200.0), "cal-35")
        .with_dedicated_kva(22.5)];
    let result = solve(&segments);
    let s = &result.segments[0];

    assert!(s.is_compliant);
    assert!(s.cumulative_drop_pct > 4.8 && s.cumulative_drop_pct <= 6.0);
    assert_eq!(result.suggestions.len(), 1);
    assert_eq!(
        result.suggestions[0].description,
        "Otimização preventiva sugerida."
    );
    assert_eq!(result.suggestions[0].suggested_conductor.as_str(), "cal-50");
}

#[test]
fn test_idempotent() {
    let feeder = reference_feeder();
    assert_eq!(solve(&feeder), solve(&feeder));
}

#[test]
fn test_monotonic_in_length_clients_and_load() {
    let base = solve(&reference_feeder()).max_drop_pct;

    let mut longer = reference_feeder();
    longer[1].length = Meters(60.0);
    assert!(solve(&longer).max_drop_pct >= base);

    let mut more_clients = reference_feeder();
    more_clients[0].clients.three_phase = 4;
    assert!(solve(&more_clients).max_drop_pct >= base);

    let mut heavier = reference_feeder();
    heavier[2].dedicated_kva = KiloVoltAmperes(70.0);
    assert!(solve(&heavier).max_drop_pct > base);

    // Cumulative drop never decreases along the feeder
    let result = solve(&reference_feeder());
    for pair in result.segments.windows(2) {
        assert!(pair[1].cumulative_drop_pct >= pair[0].cumulative_drop_pct);
    }
}

#[test]
fn test_local_demand_sums_to_transformer_demand() {
    let result = solve(&reference_feeder());
    let local: f64 = result
        .segments
        .iter()
        .map(|s| s.distributed_kva.value() + s.point_kva.value())
        .sum();
    assert!((local - result.total_demand_kva.value()).abs() < 0.02);
}

#[test]
fn test_demand_class_changes_distributed_load() {
    let feeder = reference_feeder();
    let catalog = ReferenceCatalog::builtin();
    let a = calculate_network(&feeder, 75.0, DemandClass::A, catalog).unwrap();
    let d = calculate_network(&feeder, 75.0, DemandClass::D, catalog).unwrap();

    assert_eq!(a.demand_class, DemandClass::A);
    assert_eq!(a.segments[0].distributed_kva, KiloVoltAmperes(7.5));
    assert_eq!(d.segments[0].distributed_kva, KiloVoltAmperes(30.0));
    assert!(d.max_drop_pct > a.max_drop_pct);
}

#[test]
fn test_unknown_conductor_fails() {
    let mut feeder = reference_feeder();
    feeder[1].conductor = "cal-999".into();
    let err = calculate_network(&feeder, 75.0, DemandClass::B, ReferenceCatalog::builtin())
        .unwrap_err();
    match err {
        LvError::UnknownReference { kind, id } => {
            assert_eq!(kind, CatalogKind::Conductor);
            assert_eq!(id, "cal-999");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_lighting_only_matters_with_fixtures() {
    let mut feeder = reference_feeder();
    feeder[2].lighting = "IP 9000W".to_string();
    feeder[2].lighting_quantity = 0;
    assert!(
        calculate_network(&feeder, 75.0, DemandClass::B, ReferenceCatalog::builtin()).is_ok()
    );

    feeder[2].lighting_quantity = 2;
    let err = calculate_network(&feeder, 75.0, DemandClass::B, ReferenceCatalog::builtin())
        .unwrap_err();
    assert!(matches!(
        err,
        LvError::UnknownReference {
            kind: CatalogKind::Lighting,
            ..
        }
    ));
}

#[test]
fn test_invalid_segment_values() {
    let mut negative = reference_feeder();
    negative[0].length = Meters(-5.0);
    assert!(matches!(
        calculate_network(&negative, 75.0, DemandClass::B, ReferenceCatalog::builtin()),
        Err(LvError::Validation(_))
    ));

    let mut infinite = reference_feeder();
    infinite[2].dedicated_kva = KiloVoltAmperes(f64::INFINITY);
    assert!(matches!(
        calculate_network(&infinite, 75.0, DemandClass::B, ReferenceCatalog::builtin()),
        Err(LvError::Validation(_))
    ));
}

#[test]
fn test_larger_transformer_lowers_occupancy_and_raises_short_circuit() {
    let feeder = reference_feeder();
    let catalog = ReferenceCatalog::builtin();
    let small = calculate_network(&feeder, 75.0, DemandClass::B, catalog).unwrap();
    let large = calculate_network(&feeder, 150.0, DemandClass::B, catalog).unwrap();

    assert_eq!(large.transformer_occupancy_pct, 59.5);
    assert!(large.segments[0].short_circuit > small.segments[0].short_circuit);
    // Drop does not depend on the transformer rating
    assert_eq!(large.max_drop_pct, small.max_drop_pct);
}

#[test]
fn test_results_serialize_for_reports() {
    let result = solve(&reference_feeder());
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["segments"][2]["status"], "voltage_violation");
    assert_eq!(json["segments"][2]["current"], 157.46);
    assert_eq!(json["suggestions"][0]["kind"], "CABLE_UPGRADE");
    assert_eq!(json["demand_class"], "B");
}

#[test]
fn test_sensitivity_on_reference_feeder() {
    let solver = VoltageDropSolver::new();
    let points = run_sensitivity(
        &solver,
        &reference_feeder(),
        ReferenceCatalog::builtin(),
        &GrowthScenario::default(),
    )
    .unwrap();

    assert_eq!(points.len(), 11);
    assert_eq!(points[0].year, 2024);
    assert_eq!(points[10].year, 2034);
    assert_eq!(points[0].max_drop_pct, 6.42);
    assert_eq!(points[1].max_drop_pct, 6.61);
    assert!(points.iter().all(|p| p.risk == RiskLevel::High));
    assert!(points.iter().all(|p| !p.is_global_compliant));
}

#[test]
fn test_sensitivity_risk_progression() {
    // Starts healthy, crosses the preventive margin, then the critical limit
    let feeder = vec![NetworkSegment::new("s1", "", Meters(200.0), "cal-35")
        .with_dedicated_kva(19.0)];
    let points = run_sensitivity(
        &VoltageDropSolver::new(),
        &feeder,
        ReferenceCatalog::builtin(),
        &GrowthScenario::starting(2025).with_years(10),
    )
    .unwrap();

    assert_eq!(points[0].risk, RiskLevel::Low);
    assert_eq!(points.last().unwrap().risk, RiskLevel::High);
    assert!(points.iter().any(|p| p.risk == RiskLevel::Medium));
    for pair in points.windows(2) {
        assert!(pair[1].risk >= pair[0].risk);
    }
}
