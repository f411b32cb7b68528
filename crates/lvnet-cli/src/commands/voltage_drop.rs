use anyhow::Result;
use lvnet_algo::NetworkCalculationResult;
use lvnet_cli::{OutputFormat, Settings};
use lvnet_core::DemandClass;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::info;

use crate::commands::common::{
    print_json, read_input, resolve_catalog, study_solver, yes_no, NetworkFile,
};

pub fn handle(
    network: &Path,
    transformer_kva: Option<f64>,
    class: Option<DemandClass>,
    catalog: Option<&Path>,
    format: OutputFormat,
    settings: &Settings,
) -> Result<()> {
    let input: NetworkFile = read_input(network)?;
    let catalog = resolve_catalog(catalog, settings)?;
    let solver = study_solver(transformer_kva, class, &input, settings);

    info!(
        segments = input.segments.len(),
        transformer_kva = solver.transformer_kva.value(),
        class = %solver.demand_class,
        "solving feeder {}",
        network.display()
    );
    let result = solver.solve(&input.segments, &catalog)?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Plain => print_table(&result, catalog.limits.max_voltage_drop_pct),
    }
}

fn print_table(result: &NetworkCalculationResult, max_drop_pct: f64) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "SEGMENT\tNAME\tCLIENTS\tkVA\tCURRENT (A)\tDROP (%)\tCUMULATIVE (%)\tV END\tICC (kA)\tSTATUS"
    )?;
    for segment in &result.segments {
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.3}\t{}",
            segment.segment_id,
            segment.segment_name,
            segment.total_clients,
            segment.total_kva.value(),
            segment.current.value(),
            segment.voltage_drop_pct,
            segment.cumulative_drop_pct,
            segment.voltage_at_end.value(),
            segment.short_circuit.value(),
            segment.message,
        )?;
    }
    writer.flush()?;

    println!();
    println!(
        "Max drop      : {:.2} % (limit {:.1} %)",
        result.max_drop_pct, max_drop_pct
    );
    println!("Total length  : {}", result.total_length);
    println!("Total demand  : {}", result.total_demand_kva);
    println!(
        "Occupancy     : {:.1} %",
        result.transformer_occupancy_pct
    );
    if let Some(rating) = result.recommended_transformer_kva {
        println!("Transformer   : upgrade to {:.1} kVA", rating.value());
    }
    println!("Demand class  : {}", result.demand_class);
    println!("Compliant     : {}", yes_no(result.is_global_compliant));

    if !result.suggestions.is_empty() {
        println!();
        println!("Suggestions:");
        let mut writer = TabWriter::new(io::stdout());
        writeln!(writer, "  SEGMENT\tFROM\tTO\tIMPROVEMENT (%)\tNOTE")?;
        for suggestion in &result.suggestions {
            writeln!(
                writer,
                "  {}\t{}\t{}\t{:.1}\t{}",
                suggestion.segment_id,
                suggestion.current_conductor,
                suggestion.suggested_conductor,
                suggestion.improvement_pct,
                suggestion.description,
            )?;
        }
        writer.flush()?;
    }
    Ok(())
}
