use anyhow::Result;
use lvnet_algo::{run_sensitivity, GrowthScenario, SensitivityPoint};
use lvnet_cli::{OutputFormat, Settings};
use lvnet_core::DemandClass;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::info;

use crate::commands::common::{
    print_json, read_input, resolve_catalog, study_solver, yes_no, NetworkFile,
};

pub struct SensitivityArgs<'a> {
    pub network: &'a Path,
    pub transformer_kva: Option<f64>,
    pub class: Option<DemandClass>,
    pub catalog: Option<&'a Path>,
    pub scenario: GrowthScenario,
    pub format: OutputFormat,
}

pub fn handle(args: SensitivityArgs<'_>, settings: &Settings) -> Result<()> {
    let input: NetworkFile = read_input(args.network)?;
    let catalog = resolve_catalog(args.catalog, settings)?;
    let solver = study_solver(args.transformer_kva, args.class, &input, settings);

    info!(
        years = args.scenario.years,
        growth_rate = args.scenario.growth_rate,
        "projecting feeder {}",
        args.network.display()
    );
    let points = run_sensitivity(&solver, &input.segments, &catalog, &args.scenario)?;

    match args.format {
        OutputFormat::Json => print_json(&points),
        OutputFormat::Plain => print_table(&points),
    }
}

fn print_table(points: &[SensitivityPoint]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "YEAR\tLOAD FACTOR\tMAX DROP (%)\tRISK\tCOMPLIANT")?;
    for point in points {
        writeln!(
            writer,
            "{}\t{:.2}\t{:.2}\t{:?}\t{}",
            point.year,
            point.load_factor,
            point.max_drop_pct,
            point.risk,
            yes_no(point.is_global_compliant),
        )?;
    }
    writer.flush()?;
    Ok(())
}
