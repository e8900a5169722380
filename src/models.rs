//! Data models for the bubble-grid plotter.
//!
//! This module contains the core data structures used throughout the
//! application for representing observations, the gene catalog, and
//! aggregated grid cells.

use crate::error::PlotError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Regulation polarity of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Gene was up-regulated.
    Up,
    /// Gene was down-regulated.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

/// Which categorical axis a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Species,
    Tissue,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Species => write!(f, "species"),
            Axis::Tissue => write!(f, "tissue"),
        }
    }
}

/// A (tissue, species) pair as it appears in the catalog.
///
/// Serialized as a two-element array, tissue first: `["Liver", "Mus musculus"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Site {
    pub tissue: String,
    pub species: String,
}

impl Site {
    pub fn new(tissue: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            tissue: tissue.into(),
            species: species.into(),
        }
    }
}

impl From<(String, String)> for Site {
    fn from((tissue, species): (String, String)) -> Self {
        Self { tissue, species }
    }
}

impl From<Site> for (String, String) {
    fn from(site: Site) -> Self {
        (site.tissue, site.species)
    }
}

/// A single recorded regulation call for a gene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub tissue: String,
    pub species: String,
    pub direction: Direction,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} ({})", self.species, self.tissue, self.direction)
    }
}

/// A gene and its up/down observation sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRecord {
    /// Gene symbol, also used to name output files.
    pub name: String,
    /// Sites where the gene was up-regulated.
    #[serde(default)]
    pub up: Vec<Site>,
    /// Sites where the gene was down-regulated.
    #[serde(default)]
    pub down: Vec<Site>,
}

impl GeneRecord {
    /// Total number of observations, both directions.
    pub fn observation_count(&self) -> usize {
        self.up.len() + self.down.len()
    }

    /// Long-form view of the record: up observations first, then down.
    pub fn observations(&self) -> impl Iterator<Item = Observation> + '_ {
        let tag = |direction: Direction| {
            move |site: &Site| Observation {
                tissue: site.tissue.clone(),
                species: site.species.clone(),
                direction,
            }
        };
        self.up
            .iter()
            .map(tag(Direction::Up))
            .chain(self.down.iter().map(tag(Direction::Down)))
    }
}

/// The fixed category orderings defining both valid members and draw order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOrder {
    /// X-axis categories, left to right.
    pub species: Vec<String>,
    /// Y-axis categories, bottom to top.
    pub tissues: Vec<String>,
}

impl CategoryOrder {
    /// Number of cells in the complete grid.
    pub fn cell_count(&self) -> usize {
        self.species.len() * self.tissues.len()
    }

    pub fn contains(&self, axis: Axis, value: &str) -> bool {
        let members = match axis {
            Axis::Species => &self.species,
            Axis::Tissue => &self.tissues,
        };
        members.iter().any(|m| m == value)
    }
}

/// Immutable dataset: category orderings plus the gene records, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub order: CategoryOrder,
    pub genes: Vec<GeneRecord>,
}

impl Catalog {
    /// Look up a gene by exact name.
    pub fn gene(&self, name: &str) -> Option<&GeneRecord> {
        self.genes.iter().find(|g| g.name == name)
    }

    /// Genes to process, in catalog order.
    ///
    /// With `names`, only those genes are returned; every name must exist.
    pub fn select(&self, names: Option<&[String]>) -> Result<Vec<&GeneRecord>, PlotError> {
        let Some(names) = names else {
            return Ok(self.genes.iter().collect());
        };

        if let Some(missing) = names.iter().find(|n| self.gene(n.trim()).is_none()) {
            return Err(PlotError::UnknownGene(missing.trim().to_string()));
        }

        Ok(self
            .genes
            .iter()
            .filter(|g| names.iter().any(|n| n.trim() == g.name))
            .collect())
    }
}

/// Up/down tallies for one (species, tissue) grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAggregate {
    pub species: String,
    pub tissue: String,
    pub up_count: usize,
    pub down_count: usize,
}

impl CellAggregate {
    /// Total observations in the cell.
    pub fn total(&self) -> usize {
        self.up_count + self.down_count
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Aggregated grid for one gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneGrid {
    /// Gene name.
    pub gene: String,
    /// One entry per species x tissue pair, species outer, tissue inner.
    pub cells: Vec<CellAggregate>,
    /// Observations that matched no cell of the grid.
    pub discarded: Vec<Observation>,
}

impl GeneGrid {
    pub fn up_total(&self) -> usize {
        self.cells.iter().map(|c| c.up_count).sum()
    }

    pub fn down_total(&self) -> usize {
        self.cells.iter().map(|c| c.down_count).sum()
    }

    /// Find the cell for a (species, tissue) pair.
    pub fn cell(&self, species: &str, tissue: &str) -> Option<&CellAggregate> {
        self.cells
            .iter()
            .find(|c| c.species == species && c.tissue == tissue)
    }
}

/// Bubble fill color, keyed on whether any up observation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleColor {
    Up,
    Down,
}

impl BubbleColor {
    /// CSS color used in the chart.
    pub fn css(&self) -> &'static str {
        match self {
            BubbleColor::Up => "red",
            BubbleColor::Down => "blue",
        }
    }
}

/// Visual attributes of one bubble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubbleStyle {
    /// Marker area in points squared.
    pub size: f64,
    pub color: BubbleColor,
}

/// One row of the JSON grid report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellRow {
    pub species: String,
    pub tissue: String,
    pub up_count: usize,
    pub down_count: usize,
    /// Marker area in points squared.
    pub size: f64,
    pub color: BubbleColor,
}

/// Metadata about a gene's grid report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartMetadata {
    /// Gene name.
    pub gene: String,
    /// Date and time the report was written.
    pub generated_at: DateTime<Utc>,
    /// Marker area per observation.
    pub size_factor: f64,
    pub species_order: Vec<String>,
    pub tissue_order: Vec<String>,
    /// Observations that matched no grid cell.
    pub discarded: Vec<Observation>,
}

/// The complete JSON grid report for one gene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartReport {
    pub metadata: ChartMetadata,
    pub cells: Vec<CellRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> GeneRecord {
        GeneRecord {
            name: "TEST".to_string(),
            up: vec![Site::new("Liver", "Mus musculus")],
            down: vec![
                Site::new("Muscle", "Homo sapiens"),
                Site::new("Fat", "Rattus norvegicus"),
            ],
        }
    }

    #[test]
    fn test_observations_order_and_direction() {
        let obs: Vec<Observation> = sample_record().observations().collect();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].direction, Direction::Up);
        assert_eq!(obs[0].tissue, "Liver");
        assert_eq!(obs[1].direction, Direction::Down);
        assert_eq!(obs[2].species, "Rattus norvegicus");
    }

    #[test]
    fn test_site_serializes_as_pair() {
        let site = Site::new("Liver", "Mus musculus");
        let json = serde_json::to_string(&site).unwrap();
        assert_eq!(json, r#"["Liver","Mus musculus"]"#);

        let parsed: Site = serde_json::from_str(r#"["Heart","Rattus norvegicus"]"#).unwrap();
        assert_eq!(parsed.tissue, "Heart");
        assert_eq!(parsed.species, "Rattus norvegicus");
    }

    #[test]
    fn test_category_order_contains() {
        let order = CategoryOrder {
            species: vec!["Homo sapiens".to_string()],
            tissues: vec!["Brain".to_string(), "Fat".to_string()],
        };
        assert_eq!(order.cell_count(), 2);
        assert!(order.contains(Axis::Species, "Homo sapiens"));
        assert!(!order.contains(Axis::Species, "Brain"));
        assert!(order.contains(Axis::Tissue, "Fat"));
    }

    #[test]
    fn test_cell_totals() {
        let cell = CellAggregate {
            species: "Mus musculus".to_string(),
            tissue: "Muscle".to_string(),
            up_count: 1,
            down_count: 5,
        };
        assert_eq!(cell.total(), 6);
        assert!(!cell.is_empty());
    }

    #[test]
    fn test_catalog_select() {
        let catalog = Catalog {
            order: CategoryOrder {
                species: vec!["Homo sapiens".to_string()],
                tissues: vec!["Brain".to_string()],
            },
            genes: vec![
                GeneRecord {
                    name: "A".to_string(),
                    up: vec![],
                    down: vec![],
                },
                sample_record(),
                GeneRecord {
                    name: "B".to_string(),
                    up: vec![],
                    down: vec![],
                },
            ],
        };

        assert_eq!(catalog.select(None).unwrap().len(), 3);

        let names = vec!["B".to_string(), " A".to_string()];
        let picked: Vec<&str> = catalog
            .select(Some(names.as_slice()))
            .unwrap()
            .into_iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(picked, vec!["A", "B"]);

        let names = vec!["A".to_string(), "MISSING".to_string()];
        assert!(matches!(
            catalog.select(Some(names.as_slice())),
            Err(PlotError::UnknownGene(name)) if name == "MISSING"
        ));
    }

    #[test]
    fn test_bubble_color_css() {
        assert_eq!(BubbleColor::Up.css(), "red");
        assert_eq!(BubbleColor::Down.css(), "blue");
        assert_eq!(Direction::Down.to_string(), "Down");
    }
}
