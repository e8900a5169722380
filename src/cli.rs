//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// GeneBubbles - bubble-grid plots of gene regulation
///
/// Draws one chart per gene over a species axis and a tissue axis.
/// Bubble size is the number of observations in a cell, red bubbles
/// mark cells with any up-regulation and blue bubbles the rest.
///
/// Examples:
///   genebubbles
///   genebubbles --output-dir plots --genes SPARC,CA4
///   genebubbles --format json --strict
///   genebubbles --dry-run
///   genebubbles --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory to write charts into
    ///
    /// Defaults to the config file setting, or the current directory.
    #[arg(short, long, value_name = "DIR", env = "GENEBUBBLES_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .genebubbles.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only render these genes (comma-separated)
    ///
    /// Example: --genes SPARC,CA4
    #[arg(short, long, value_name = "NAMES", value_delimiter = ',')]
    pub genes: Option<Vec<String>>,

    /// Output format (svg, json)
    #[arg(long, default_value = "svg", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Fail on observations whose species or tissue is not in the orderings
    ///
    /// Without this flag such observations are dropped with a warning.
    #[arg(long)]
    pub strict: bool,

    /// Aggregate and print the grids without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// List the genes in the catalog and exit
    #[arg(long)]
    pub list: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .genebubbles.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the per-gene artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// SVG bubble chart (default)
    #[default]
    Svg,
    /// JSON grid of aggregated cells
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref genes) = self.genes {
            if genes.iter().any(|g| g.trim().is_empty()) {
                return Err("Gene names in --genes must not be empty".to_string());
            }
        }

        if let Some(ref dir) = self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
