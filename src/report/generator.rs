//! Per-gene artifact generation.
//!
//! This module names output files, builds SVG and JSON artifacts from an
//! aggregated grid, writes them to disk, and formats the console tables
//! used by `--dry-run`.

use super::chart::{bubble_style, render_svg};
use crate::cli::OutputFormat;
use crate::error::PlotError;
use crate::models::{CategoryOrder, CellRow, ChartMetadata, ChartReport, GeneGrid};
use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Where and how artifacts get written.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Directory receiving the files.
    pub output_dir: PathBuf,
    /// File name prefix placed before the gene name.
    pub file_prefix: String,
    pub format: OutputFormat,
    /// Marker area per observation.
    pub size_factor: f64,
}

impl OutputOptions {
    /// Path of the artifact for a gene: `<dir>/<prefix><gene>.<ext>`.
    pub fn output_path(&self, gene: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}{}.{}",
            self.file_prefix,
            gene,
            self.format.extension()
        ))
    }
}

/// Build the JSON report for a grid.
pub fn build_chart_report(
    grid: &GeneGrid,
    order: &CategoryOrder,
    size_factor: f64,
) -> ChartReport {
    let cells = grid
        .cells
        .iter()
        .map(|cell| {
            let style = bubble_style(cell, size_factor);
            CellRow {
                species: cell.species.clone(),
                tissue: cell.tissue.clone(),
                up_count: cell.up_count,
                down_count: cell.down_count,
                size: style.size,
                color: style.color,
            }
        })
        .collect();

    ChartReport {
        metadata: ChartMetadata {
            gene: grid.gene.clone(),
            generated_at: Utc::now(),
            size_factor,
            species_order: order.species.clone(),
            tissue_order: order.tissues.clone(),
            discarded: grid.discarded.clone(),
        },
        cells,
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ChartReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Render the artifact content for a grid in the requested format.
pub fn generate_artifact(
    grid: &GeneGrid,
    order: &CategoryOrder,
    options: &OutputOptions,
) -> Result<String> {
    match options.format {
        OutputFormat::Svg => Ok(render_svg(
            &grid.gene,
            &grid.cells,
            order,
            options.size_factor,
        )),
        OutputFormat::Json => {
            generate_json_report(&build_chart_report(grid, order, options.size_factor))
        }
    }
}

/// Write content to a path, creating missing parent directories.
pub fn write_artifact(path: &Path, content: &str) -> Result<(), PlotError> {
    let to_write_error = |source| PlotError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(to_write_error)?;
        }
    }

    std::fs::write(path, content).map_err(to_write_error)
}

/// Generate and write the artifact for one gene. Returns the written path.
pub fn write_gene(
    grid: &GeneGrid,
    order: &CategoryOrder,
    options: &OutputOptions,
) -> Result<PathBuf> {
    let content = generate_artifact(grid, order, options)?;
    let path = options.output_path(&grid.gene);
    write_artifact(&path, &content)?;
    Ok(path)
}

/// Format a grid as a text table: tissues as rows (top tissue first),
/// species as columns, each cell as `up/down` or `.` when empty.
pub fn format_grid_table(grid: &GeneGrid, order: &CategoryOrder) -> String {
    let tissue_width = order
        .tissues
        .iter()
        .map(|t| t.len())
        .max()
        .unwrap_or(0)
        .max("Tissue".len());
    let col_widths: Vec<usize> = order.species.iter().map(|s| s.len().max(5)).collect();

    let mut lines = Vec::new();

    let mut header = format!("{:<width$}", "Tissue", width = tissue_width);
    for (species, width) in order.species.iter().zip(&col_widths) {
        header.push_str(&format!(" | {:^width$}", species, width = *width));
    }
    lines.push(header);

    for tissue in order.tissues.iter().rev() {
        let mut row = format!("{:<width$}", tissue, width = tissue_width);
        for (species, width) in order.species.iter().zip(&col_widths) {
            let value = match grid.cell(species, tissue) {
                Some(cell) if !cell.is_empty() => format!("{}/{}", cell.up_count, cell.down_count),
                _ => ".".to_string(),
            };
            row.push_str(&format!(" | {:^width$}", value, width = *width));
        }
        lines.push(row);
    }

    lines.join("\n")
}
