use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use lvnet_core::{DemandClass, GeoPoint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Extra configuration file layered over ./lvnet.toml
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Voltage drop along a radial feeder
    VoltageDrop {
        /// Network file (JSON or TOML) with the ordered segment list
        #[arg(value_hint = ValueHint::FilePath)]
        network: PathBuf,
        /// Transformer rating in kVA
        #[arg(long)]
        transformer_kva: Option<f64>,
        /// Demand class (A-D)
        #[arg(long)]
        class: Option<DemandClass>,
        /// Reference catalog file (`.json` is JSON, anything else TOML)
        #[arg(long, value_hint = ValueHint::FilePath)]
        catalog: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Resultant cable pull on a pole
    Stress {
        /// Pole file (JSON or TOML) with the attached cables
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Catalog pole whose nominal load is used
        #[arg(long, conflicts_with = "nominal_load")]
        pole: Option<String>,
        /// Nominal pole load in daN
        #[arg(long)]
        nominal_load: Option<f64>,
        #[arg(long, value_hint = ValueHint::FilePath)]
        catalog: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Span length between two surveyed points
    Span {
        /// First point as lat,lng,alt
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: GeoPoint,
        /// Second point as lat,lng,alt
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: GeoPoint,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Area enclosed by a surveyed polygon
    Area {
        /// Polygon file (JSON or TOML) with a `points` list
        #[arg(value_hint = ValueHint::FilePath)]
        polygon: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Project the feeder's maximum drop over years of load growth
    Sensitivity {
        #[arg(value_hint = ValueHint::FilePath)]
        network: PathBuf,
        #[arg(long)]
        transformer_kva: Option<f64>,
        #[arg(long)]
        class: Option<DemandClass>,
        #[arg(long, value_hint = ValueHint::FilePath)]
        catalog: Option<PathBuf>,
        /// Years projected after the base year
        #[arg(long, default_value_t = 10)]
        years: u32,
        /// Yearly growth as a fraction (0.03 = 3 %)
        #[arg(long, default_value_t = 0.03)]
        growth: f64,
        #[arg(long, default_value_t = 2024)]
        base_year: i32,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Reference catalog utilities
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Check a catalog file (or the built-in catalog) for inconsistencies;
    /// `.json` files are JSON, anything else TOML
    Validate {
        #[arg(value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Print the active catalog as TOML or JSON
    Show {
        #[arg(long, value_hint = ValueHint::FilePath)]
        catalog: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Plain,
    /// Pretty-printed JSON
    Json,
}

/// Parse `lat,lng` or `lat,lng,alt`.
pub fn parse_point(value: &str) -> Result<GeoPoint, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(format!("expected lat,lng[,alt], got '{}'", value));
    }
    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        let number: f64 = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
        numbers.push(number);
    }
    let point = GeoPoint::new(numbers[0], numbers[1]);
    Ok(match numbers.get(2) {
        Some(alt) => point.with_alt(*alt),
        None => point,
    })
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
