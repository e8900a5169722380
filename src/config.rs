//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.genebubbles.toml` files. Every setting has a compiled default, so the
//! built-in gene catalog is used unless a config file replaces it.

use crate::error::PlotError;
use crate::models::{Axis, Catalog, CategoryOrder, GeneRecord, Site};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".genebubbles.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Category orderings and gene catalog.
    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory charts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Prefix for output file names, followed by the gene name.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_file_prefix() -> String {
    "tissues".to_string()
}

/// The dataset that gets plotted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// X-axis order, also the set of valid species.
    #[serde(default = "default_species_order")]
    pub species_order: Vec<String>,

    /// Y-axis order (bottom to top), also the set of valid tissues.
    #[serde(default = "default_tissue_order")]
    pub tissue_order: Vec<String>,

    /// Genes in processing order.
    #[serde(default = "default_genes")]
    pub genes: Vec<GeneRecord>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            species_order: default_species_order(),
            tissue_order: default_tissue_order(),
            genes: default_genes(),
        }
    }
}

pub fn default_species_order() -> Vec<String> {
    vec![
        "Mus musculus",
        "Homo sapiens",
        "Rattus norvegicus",
        "Canis lupus familiaris",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_tissue_order() -> Vec<String> {
    vec![
        "Cochlea",
        "Trachea",
        "Reproductive",
        "Muscle",
        "Liver",
        "Immune",
        "Heart",
        "Fat",
        "Brain",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const MOUSE: &str = "Mus musculus";
const HUMAN: &str = "Homo sapiens";
const RAT: &str = "Rattus norvegicus";
const DOG: &str = "Canis lupus familiaris";

fn sites(pairs: &[(&str, &str)]) -> Vec<Site> {
    pairs
        .iter()
        .map(|&(tissue, species)| Site::new(tissue, species))
        .collect()
}

fn gene(name: &str, up: &[(&str, &str)], down: &[(&str, &str)]) -> GeneRecord {
    GeneRecord {
        name: name.to_string(),
        up: sites(up),
        down: sites(down),
    }
}

pub fn default_genes() -> Vec<GeneRecord> {
    vec![
        gene(
            "SPARC",
            &[("Liver", MOUSE)],
            &[
                ("Muscle", HUMAN),
                ("Immune", MOUSE),
                ("Muscle", MOUSE),
                ("Trachea", MOUSE),
                ("Fat", MOUSE),
                ("Muscle", MOUSE),
                ("Muscle", DOG),
                ("Heart", RAT),
                ("Fat", RAT),
            ],
        ),
        gene(
            "DIRC2",
            &[],
            &[
                ("Muscle", HUMAN),
                ("Muscle", HUMAN),
                ("Muscle", MOUSE),
                ("Trachea", MOUSE),
                ("Fat", MOUSE),
                ("Heart", RAT),
                ("Liver", RAT),
            ],
        ),
        gene(
            "CA4",
            &[],
            &[
                ("Brain", HUMAN),
                ("Muscle", HUMAN),
                ("Muscle", HUMAN),
                ("Immune", MOUSE),
                ("Liver", MOUSE),
                ("Fat", MOUSE),
                ("Brain", MOUSE),
                ("Heart", MOUSE),
            ],
        ),
        gene(
            "CDC20",
            &[],
            &[
                ("Immune", MOUSE),
                ("Muscle", MOUSE),
                ("Liver", MOUSE),
                ("Immune", MOUSE),
                ("Brain", MOUSE),
                ("Muscle", MOUSE),
                ("Liver", RAT),
            ],
        ),
        gene(
            "RSRC1",
            &[
                ("Brain", HUMAN),
                ("Muscle", HUMAN),
                ("Fat", MOUSE),
                ("Brain", MOUSE),
                ("Brain", MOUSE),
                ("Fat", RAT),
                ("Liver", RAT),
            ],
            &[],
        ),
        gene(
            "CASP1",
            &[
                ("Muscle", HUMAN),
                ("Trachea", MOUSE),
                ("Cochlea", MOUSE),
                ("Fat", MOUSE),
                ("Heart", RAT),
                ("Fat", RAT),
                ("Liver", RAT),
            ],
            &[],
        ),
    ]
}

/// The built-in catalog.
#[cfg(test)]
pub fn default_catalog() -> Catalog {
    DatasetConfig::default().catalog()
}

impl DatasetConfig {
    /// Build the immutable catalog passed to aggregation.
    pub fn catalog(&self) -> Catalog {
        Catalog {
            order: CategoryOrder {
                species: self.species_order.clone(),
                tissues: self.tissue_order.clone(),
            },
            genes: self.genes.clone(),
        }
    }

    /// Check orderings and gene names.
    ///
    /// Observation categories are not checked here; unknown ones are
    /// dropped during aggregation unless strict mode asks otherwise.
    pub fn validate(&self) -> Result<(), PlotError> {
        for (axis, members) in [
            (Axis::Species, &self.species_order),
            (Axis::Tissue, &self.tissue_order),
        ] {
            if members.is_empty() {
                return Err(PlotError::EmptyOrdering(axis));
            }
            let mut seen = HashSet::new();
            for value in members {
                if !seen.insert(value.as_str()) {
                    return Err(PlotError::DuplicateCategory {
                        axis,
                        value: value.clone(),
                    });
                }
            }
        }

        let mut names = HashSet::new();
        for gene in &self.genes {
            // Gene names become file names.
            if gene.name.is_empty() || gene.name.contains(|c: char| c == '/' || c == '\\') {
                return Err(PlotError::InvalidGeneName(gene.name.clone()));
            }
            if !names.insert(gene.name.as_str()) {
                return Err(PlotError::DuplicateGene(gene.name.clone()));
            }
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load `.genebubbles.toml` from `dir` if it is there.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let default_path = dir.join(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(&default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.display().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
