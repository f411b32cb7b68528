//! Input files, catalog resolution and output helpers shared by the commands.

use anyhow::{Context, Result};
use lvnet_algo::VoltageDropSolver;
use lvnet_core::{
    DemandClass, GeoPoint, MechanicalInputItem, NetworkSegment, PoleId, ReferenceCatalog,
};
use lvnet_cli::Settings;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Feeder description read by `voltage-drop` and `sensitivity`.
#[derive(Debug, Deserialize)]
pub struct NetworkFile {
    pub segments: Vec<NetworkSegment>,
    #[serde(default)]
    pub transformer_kva: Option<f64>,
    #[serde(default)]
    pub demand_class: Option<DemandClass>,
}

/// Cables attached to one pole, read by `stress`.
#[derive(Debug, Deserialize)]
pub struct PoleFile {
    pub cables: Vec<MechanicalInputItem>,
    #[serde(default)]
    pub pole: Option<PoleId>,
    #[serde(default)]
    pub nominal_load: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PolygonFile {
    pub points: Vec<GeoPoint>,
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

/// Read a `.toml` file as TOML and anything else as JSON.
pub fn read_input<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if is_toml(path) {
        toml::from_str(&content).with_context(|| format!("parsing TOML {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("parsing JSON {}", path.display()))
    }
}

/// `--catalog`, then `study.catalog`, then the built-in tables.
pub fn resolve_catalog(
    flag: Option<&Path>,
    settings: &Settings,
) -> Result<Cow<'static, ReferenceCatalog>> {
    match flag.or(settings.study.catalog.as_deref()) {
        Some(path) => {
            let catalog = ReferenceCatalog::load(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            Ok(Cow::Owned(catalog))
        }
        None => {
            debug!("using built-in reference catalog");
            Ok(Cow::Borrowed(ReferenceCatalog::builtin()))
        }
    }
}

/// Feeder solver from flags, then the network file, then configuration.
pub fn study_solver(
    transformer_kva: Option<f64>,
    class: Option<DemandClass>,
    network: &NetworkFile,
    settings: &Settings,
) -> VoltageDropSolver {
    let kva = transformer_kva
        .or(network.transformer_kva)
        .unwrap_or(settings.study.transformer_kva);
    let class = class
        .or(network.demand_class)
        .unwrap_or(settings.study.demand_class);
    VoltageDropSolver::new()
        .with_transformer_kva(kva)
        .with_demand_class(class)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(io::stdout(), value)?;
    println!();
    Ok(())
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
