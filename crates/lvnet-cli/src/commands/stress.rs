use anyhow::{anyhow, Result};
use lvnet_algo::{MechanicalCalcResult, PoleStressSolver};
use lvnet_cli::{OutputFormat, Settings};
use lvnet_core::PoleId;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::info;

use crate::commands::common::{print_json, read_input, resolve_catalog, yes_no, PoleFile};

pub fn handle(
    input: &Path,
    pole: Option<&str>,
    nominal_load: Option<f64>,
    catalog: Option<&Path>,
    format: OutputFormat,
    settings: &Settings,
) -> Result<()> {
    let file: PoleFile = read_input(input)?;
    let catalog = resolve_catalog(catalog, settings)?;
    let solver = PoleStressSolver::new();

    info!(cables = file.cables.len(), "balancing pole {}", input.display());

    // A flag on the command line replaces whatever the file specifies.
    let result = match (pole, nominal_load) {
        (Some(id), _) => solver.solve_for_pole(&PoleId::from(id), &file.cables, &catalog)?,
        (None, Some(load)) => solver.solve(load, &file.cables, &catalog)?,
        (None, None) => match (&file.pole, file.nominal_load) {
            (Some(id), _) => solver.solve_for_pole(id, &file.cables, &catalog)?,
            (None, Some(load)) => solver.solve(load, &file.cables, &catalog)?,
            (None, None) => {
                return Err(anyhow!(
                    "no pole rating: pass --pole or --nominal-load, or set `pole` or `nominal_load` in {}",
                    input.display()
                ))
            }
        },
    };

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Plain => print_table(&result),
    }
}

fn print_table(result: &MechanicalCalcResult) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "CABLE\tCONDUCTOR\tREAL SPAN (m)\tPHASE (daN)\tNEUTRAL (daN)\tANGLE (°)\tFX (daN)\tFY (daN)"
    )?;
    for cable in &result.cables {
        writeln!(
            writer,
            "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.1}\t{:.2}\t{:.2}",
            cable.id,
            cable.label,
            cable.real_span.value(),
            cable.phase_tension.value(),
            cable.neutral_tension.value(),
            cable.angle.value(),
            cable.fx.value(),
            cable.fy.value(),
        )?;
    }
    writer.flush()?;

    println!();
    if let Some(pole) = &result.pole_id {
        println!("Pole          : {}", pole);
    }
    println!(
        "Resultant     : {} at {:.2}°",
        result.resultant,
        result.resultant_angle.value()
    );
    println!("Nominal load  : {}", result.nominal_resistance);
    println!("Usage         : {:.1} %", result.usage_pct);
    println!("Compliant     : {}", yes_no(result.is_compliant));
    Ok(())
}
