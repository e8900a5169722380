//! GeneBubbles - bubble-grid plots of gene regulation
//!
//! A CLI tool that aggregates up/down regulation calls per gene over a
//! fixed species x tissue grid and draws one bubble chart per gene.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (config, unknown gene or category in strict mode, write failure)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE};
use models::Catalog;
use report::OutputOptions;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("GeneBubbles v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: write a default .genebubbles.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with the built-in gene catalog.", CONFIG_FILE);
    println!("   Edit it to change the output directory, orderings, or genes.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` overrides the level derived from the flags.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Aggregate and render every selected gene.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config
        .dataset
        .validate()
        .context("Invalid dataset configuration")?;

    let catalog = config.dataset.catalog();
    info!(
        "Catalog: {} genes over {} species x {} tissues",
        catalog.genes.len(),
        catalog.order.species.len(),
        catalog.order.tissues.len()
    );

    if args.list {
        print_catalog(&catalog);
        return Ok(());
    }

    let genes = catalog.select(args.genes.as_deref())?;

    let options = OutputOptions {
        output_dir: PathBuf::from(&config.general.output_dir),
        file_prefix: config.general.file_prefix.clone(),
        format: args.format,
        size_factor: report::SIZE_FACTOR,
    };

    if args.dry_run {
        println!("🔍 Dry run: aggregating {} genes (no files written)\n", genes.len());
    }

    let mut written = Vec::with_capacity(genes.len());
    let mut discarded_total = 0;

    for gene in genes {
        if args.strict {
            analysis::check_categories(gene, &catalog.order)?;
        }

        let grid = analysis::aggregate_gene(gene, &catalog.order);
        for obs in &grid.discarded {
            warn!("{}: dropping observation outside the grid: {}", grid.gene, obs);
        }
        discarded_total += grid.discarded.len();

        debug!(
            "{}: {} up, {} down, {} of {} cells occupied",
            grid.gene,
            grid.up_total(),
            grid.down_total(),
            analysis::occupied_cells(&grid),
            catalog.order.cell_count()
        );

        if args.dry_run {
            println!("🧬 {}", grid.gene);
            println!("{}", report::format_grid_table(&grid, &catalog.order));
            if let Some(cell) = analysis::busiest_cell(&grid) {
                println!(
                    "   Largest bubble: {} / {} ({} observations)\n",
                    cell.species,
                    cell.tissue,
                    cell.total()
                );
            } else {
                println!("   No observations on the grid\n");
            }
            continue;
        }

        let path = report::write_gene(&grid, &catalog.order, &options)
            .with_context(|| format!("Failed to write chart for {}", grid.gene))?;
        info!("Wrote {}", path.display());
        written.push(path);
    }

    let duration = start_time.elapsed().as_secs_f64();

    if args.dry_run {
        println!("✅ Dry run complete. No files were written.");
        return Ok(());
    }

    if !args.quiet {
        println!("\n📊 Summary:");
        println!("   Charts written: {}", written.len());
        for path in &written {
            println!("     📄 {}", path.display());
        }
        if discarded_total > 0 {
            println!("   Observations outside the grid: {}", discarded_total);
        }
        println!("   Duration: {:.2}s", duration);
    }

    Ok(())
}

/// Print the catalog genes with their observation counts.
fn print_catalog(catalog: &Catalog) {
    println!("Genes in catalog ({}):", catalog.genes.len());
    for gene in &catalog.genes {
        println!(
            "   {:<8} up: {:>2}  down: {:>2}  total: {:>2}",
            gene.name,
            gene.up.len(),
            gene.down.len(),
            gene.observation_count()
        );
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location. A broken file must not fall back to the built-in catalog.
    let config = Config::load_default()
        .with_context(|| format!("Failed to load default config {}", CONFIG_FILE))?;
    match config {
        Some(_) => info!("Loaded default config from {}", CONFIG_FILE),
        None => debug!("No config file found, using built-in catalog"),
    }

    Ok(config.unwrap_or_default())
}
