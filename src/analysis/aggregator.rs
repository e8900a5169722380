//! Grid aggregation and category checks.
//!
//! This module turns a gene's up/down observation lists into the complete
//! species x tissue grid, counting observations per cell and zero-filling
//! cells that have none.

use crate::error::PlotError;
use crate::models::{Axis, CategoryOrder, CellAggregate, GeneGrid, GeneRecord, Observation, Site};
use std::collections::HashMap;

/// Count sites per (species, tissue) pair.
fn tally(sites: &[Site]) -> HashMap<(&str, &str), usize> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();

    for site in sites {
        *counts
            .entry((site.species.as_str(), site.tissue.as_str()))
            .or_default() += 1;
    }

    counts
}

/// Aggregate up/down sites into the full species x tissue grid.
///
/// Cells are emitted species-major (species outer, tissue inner), one per
/// pair, with `(0, 0)` for pairs that have no observations. Sites naming a
/// category outside the orderings land in no cell and are dropped.
pub fn aggregate(
    up: &[Site],
    down: &[Site],
    species_order: &[String],
    tissue_order: &[String],
) -> Vec<CellAggregate> {
    let up_counts = tally(up);
    let down_counts = tally(down);

    let mut cells = Vec::with_capacity(species_order.len() * tissue_order.len());

    for species in species_order {
        for tissue in tissue_order {
            let key = (species.as_str(), tissue.as_str());
            cells.push(CellAggregate {
                species: species.clone(),
                tissue: tissue.clone(),
                up_count: up_counts.get(&key).copied().unwrap_or(0),
                down_count: down_counts.get(&key).copied().unwrap_or(0),
            });
        }
    }

    cells
}

/// Observations of a record that fall outside the category orderings.
pub fn discarded_observations(record: &GeneRecord, order: &CategoryOrder) -> Vec<Observation> {
    record
        .observations()
        .filter(|obs| {
            !order.contains(Axis::Species, &obs.species)
                || !order.contains(Axis::Tissue, &obs.tissue)
        })
        .collect()
}

/// Aggregate one gene record into its grid.
pub fn aggregate_gene(record: &GeneRecord, order: &CategoryOrder) -> GeneGrid {
    GeneGrid {
        gene: record.name.clone(),
        cells: aggregate(&record.up, &record.down, &order.species, &order.tissues),
        discarded: discarded_observations(record, order),
    }
}

/// Fail on the first observation naming a category outside the orderings.
pub fn check_categories(record: &GeneRecord, order: &CategoryOrder) -> Result<(), PlotError> {
    for obs in record.observations() {
        if !order.contains(Axis::Species, &obs.species) {
            return Err(PlotError::UnknownCategory {
                gene: record.name.clone(),
                axis: Axis::Species,
                value: obs.species,
            });
        }
        if !order.contains(Axis::Tissue, &obs.tissue) {
            return Err(PlotError::UnknownCategory {
                gene: record.name.clone(),
                axis: Axis::Tissue,
                value: obs.tissue,
            });
        }
    }

    Ok(())
}

/// Number of cells with at least one observation.
pub fn occupied_cells(grid: &GeneGrid) -> usize {
    grid.cells.iter().filter(|c| !c.is_empty()).count()
}

/// The cell with the most observations, first in grid order on ties.
pub fn busiest_cell(grid: &GeneGrid) -> Option<&CellAggregate> {
    grid.cells
        .iter()
        .filter(|c| !c.is_empty())
        .min_by_key(|c| std::cmp::Reverse(c.total()))
}
