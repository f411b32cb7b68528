use anyhow::{Context, Result};
use clap::Parser;
use lvnet_algo::GrowthScenario;
use lvnet_cli::{Cli, Commands, Settings};
use std::io;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::sensitivity::SensitivityArgs;

/// RUST_LOG wins, then `--log-level`, then `logging.level` from configuration.
fn init_logging(cli_level: Option<tracing::Level>, configured: &str) {
    let fallback = cli_level
        .map(|level| level.to_string())
        .unwrap_or_else(|| configured.to_string())
        .to_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::VoltageDrop { .. } => "voltage-drop",
        Commands::Stress { .. } => "stress",
        Commands::Span { .. } => "span",
        Commands::Area { .. } => "area",
        Commands::Sensitivity { .. } => "sensitivity",
        Commands::Catalog { .. } => "catalog",
    }
}

fn run(command: &Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::VoltageDrop {
            network,
            transformer_kva,
            class,
            catalog,
            format,
        } => commands::voltage_drop::handle(
            network,
            *transformer_kva,
            *class,
            catalog.as_deref(),
            *format,
            settings,
        ),
        Commands::Stress {
            input,
            pole,
            nominal_load,
            catalog,
            format,
        } => commands::stress::handle(
            input,
            pole.as_deref(),
            *nominal_load,
            catalog.as_deref(),
            *format,
            settings,
        ),
        Commands::Span { from, to, format } => commands::geo::handle_span(from, to, *format),
        Commands::Area { polygon, format } => commands::geo::handle_area(polygon, *format),
        Commands::Sensitivity {
            network,
            transformer_kva,
            class,
            catalog,
            years,
            growth,
            base_year,
            format,
        } => commands::sensitivity::handle(
            SensitivityArgs {
                network,
                transformer_kva: *transformer_kva,
                class: *class,
                catalog: catalog.as_deref(),
                scenario: GrowthScenario::starting(*base_year)
                    .with_years(*years)
                    .with_growth_rate(*growth),
                format: *format,
            },
            settings,
        ),
        Commands::Catalog { command } => commands::catalog::handle(command, settings),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("loading configuration");
    let level = settings
        .as_ref()
        .map(|s| s.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.log_level, &level);

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(?settings, "configuration");

    let name = command_name(&cli.command);
    match run(&cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} failed: {:#}", name, e);
            ExitCode::FAILURE
        }
    }
}
