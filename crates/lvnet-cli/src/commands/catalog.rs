use anyhow::{bail, Context, Result};
use lvnet_cli::{CatalogCommands, OutputFormat, Settings};
use lvnet_core::{Diagnostics, ReferenceCatalog};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::commands::common::{print_json, resolve_catalog};

pub fn handle(command: &CatalogCommands, settings: &Settings) -> Result<()> {
    match command {
        CatalogCommands::Validate { path, format } => validate(path.as_deref(), *format),
        CatalogCommands::Show { catalog, format } => {
            let catalog = resolve_catalog(catalog.as_deref(), settings)?;
            match format {
                OutputFormat::Json => print_json(catalog.as_ref()),
                OutputFormat::Plain => {
                    print!("{}", catalog.to_toml_string()?);
                    Ok(())
                }
            }
        }
    }
}

fn validate(path: Option<&Path>, format: OutputFormat) -> Result<()> {
    // Same format rule as --catalog, but without rejecting on the first error.
    let (label, diag) = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            let catalog = ReferenceCatalog::parse(path, &content)
                .with_context(|| format!("parsing catalog {}", path.display()))?;
            (path.display().to_string(), catalog.validate())
        }
        None => (
            "built-in catalog".to_string(),
            ReferenceCatalog::builtin().validate(),
        ),
    };
    info!("validated {}: {}", label, diag.summary());

    match format {
        OutputFormat::Json => print_json(&diag)?,
        OutputFormat::Plain => print_plain(&label, &diag),
    }

    if diag.has_errors() {
        bail!("{} has {}", label, diag.summary());
    }
    Ok(())
}

fn print_plain(label: &str, diag: &Diagnostics) {
    println!("{}: {}", label, diag.summary());
    for issue in &diag.issues {
        println!("  {}", issue);
    }
}
