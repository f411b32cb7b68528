use anyhow::Result;
use lvnet_cli::OutputFormat;
use lvnet_core::{polygon_area, span_metrics, GeoPoint};
use serde::Serialize;
use std::path::Path;

use crate::commands::common::{print_json, read_input, yes_no, PolygonFile};

#[derive(Serialize)]
struct AreaReport {
    vertices: usize,
    area_m2: f64,
}

pub fn handle_span(from: &GeoPoint, to: &GeoPoint, format: OutputFormat) -> Result<()> {
    let metrics = span_metrics(from, to)?;
    match format {
        OutputFormat::Json => print_json(&metrics),
        OutputFormat::Plain => {
            println!("Horizontal    : {}", metrics.horizontal);
            println!("Height diff   : {}", metrics.height_diff);
            println!("Real span     : {}", metrics.real_span);
            println!("Critical span : {}", yes_no(metrics.is_critical_span));
            Ok(())
        }
    }
}

pub fn handle_area(polygon: &Path, format: OutputFormat) -> Result<()> {
    let file: PolygonFile = read_input(polygon)?;
    let report = AreaReport {
        vertices: file.points.len(),
        area_m2: polygon_area(&file.points),
    };
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Plain => {
            println!("Vertices      : {}", report.vertices);
            println!("Area          : {:.2} m²", report.area_m2);
            Ok(())
        }
    }
}
