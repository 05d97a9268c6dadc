//! sensorgrid CLI
//!
//! Extracts labeled feature vectors from sensor log grids.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sensorgrid::{
    config::Config,
    core::{blocks, truncate, write_export, Dataset, ExportBuilder, ExportFormat},
    grid::read_grid,
    report::{create_shared_log_with_persistence, ExtractionLog},
    Grid, LayoutConfig, VERSION,
};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sensorgrid")]
#[command(version = VERSION)]
#[command(about = "Extract labeled feature vectors from sensor log grids", long_about = None)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log per-block decisions
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a dataset from a grid document and export it
    Extract {
        /// Grid document to read
        grid: PathBuf,

        /// Output file (defaults to the configured export directory)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Export format (json or jsonl)
        #[arg(long, default_value = "json")]
        format: ExportFormat,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Keep only records with at least this many temperature readings, truncated to it
        #[arg(long)]
        truncate: Option<NonZeroUsize>,

        /// Build blocks on a thread pool (requires the parallel feature)
        #[arg(long)]
        parallel: bool,
    },

    /// List the record blocks found in a grid without exporting
    Inspect {
        /// Grid document to read
        grid: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show cumulative extraction statistics
    Status,

    /// Show configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Command-line overrides for the layout literals.
#[derive(clap::Args)]
struct LayoutArgs {
    /// Marker text in column 2 of a record's first row
    #[arg(long)]
    marker: Option<String>,

    /// Title of the light row
    #[arg(long)]
    light_title: Option<String>,

    /// Title of the temperature row
    #[arg(long)]
    temperature_title: Option<String>,
}

impl LayoutArgs {
    fn apply(self, layout: &mut LayoutConfig) {
        if let Some(marker) = self.marker {
            layout.marker_column_text = marker;
        }
        if let Some(title) = self.light_title {
            layout.light_title = title;
        }
        if let Some(title) = self.temperature_title {
            layout.temperature_title = title;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            grid,
            output,
            format,
            layout,
            truncate,
            parallel,
        } => {
            layout.apply(&mut config.layout);
            if truncate.is_some() {
                config.truncation_length = truncate;
            }
            cmd_extract(&config, &grid, output, format, parallel)
        }
        Commands::Inspect { grid, layout } => {
            layout.apply(&mut config.layout);
            cmd_inspect(&config, &grid)
        }
        Commands::Status => {
            cmd_status(&config);
            Ok(())
        }
        Commands::Config { save } => cmd_config(&config, cli.config.as_deref(), save),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            Config::load_from(path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Config::load().context("loading config"),
    }
}

fn load_grid(path: &Path) -> anyhow::Result<Grid> {
    read_grid(path).with_context(|| format!("reading grid {}", path.display()))
}

fn cmd_extract(
    config: &Config,
    grid_path: &Path,
    output: Option<PathBuf>,
    format: ExportFormat,
    parallel: bool,
) -> anyhow::Result<()> {
    config.layout.validate()?;
    if let Err(e) = config.ensure_directories() {
        tracing::warn!("could not create directories: {e}");
    }

    println!("sensorgrid v{VERSION}");
    println!();
    println!("Reading {}", grid_path.display());
    println!("  Marker text: {}", config.layout.marker_column_text);
    println!("  Light title: {}", config.layout.light_title);
    println!("  Temperature title: {}", config.layout.temperature_title);
    match config.truncation_length {
        Some(length) => println!("  Truncation length: {length}"),
        None => println!("  Truncation: disabled"),
    }

    let grid = load_grid(grid_path)?;
    println!("  Rows: {}", grid.row_count());
    println!();

    let log = create_shared_log_with_persistence(config.stats_path());
    let dataset = assemble_dataset(&grid, &config.layout, &log, parallel);

    if let Err(e) = log.save() {
        tracing::warn!("could not save extraction stats: {e}");
    }

    let dataset = dataset.require_records()?;
    let summary = dataset.summary();
    println!(
        "Extracted {} records from {} marker rows ({} discarded)",
        summary.records, summary.marker_rows, summary.discarded
    );

    let mut builder = ExportBuilder::new();
    if let Some(name) = grid_path.file_name() {
        builder = builder.with_source(name.to_string_lossy());
    }

    let export = match config.truncation_length {
        Some(length) => {
            let records = truncate(&dataset, length);
            if records.is_empty() {
                bail!("no records have at least {length} temperature readings");
            }
            println!("Kept {} records at length {length}", records.len());
            builder.build_truncated(records, &config.layout, length.get())
        }
        None => builder.build(&dataset, &config.layout),
    };

    let output_path = output.unwrap_or_else(|| {
        config.export_path.join(format!(
            "dataset_{}.{}",
            Utc::now().format("%Y%m%d_%H%M%S"),
            format.extension()
        ))
    });

    write_export(&export, format, &output_path)
        .with_context(|| format!("writing export {}", output_path.display()))?;
    println!(
        "Exported {} samples to {:?}",
        export.samples.len(),
        output_path
    );

    Ok(())
}

#[cfg(feature = "parallel")]
fn assemble_dataset(
    grid: &Grid,
    layout: &LayoutConfig,
    log: &ExtractionLog,
    parallel: bool,
) -> Dataset {
    if parallel {
        sensorgrid::assemble_parallel(grid, layout, log)
    } else {
        sensorgrid::assemble(grid, layout, log)
    }
}

#[cfg(not(feature = "parallel"))]
fn assemble_dataset(
    grid: &Grid,
    layout: &LayoutConfig,
    log: &ExtractionLog,
    parallel: bool,
) -> Dataset {
    if parallel {
        tracing::warn!("--parallel ignored (parallel feature not enabled at compile time)");
    }
    sensorgrid::assemble(grid, layout, log)
}

fn cmd_inspect(config: &Config, grid_path: &Path) -> anyhow::Result<()> {
    config.layout.validate()?;
    let grid = load_grid(grid_path)?;
    let log = ExtractionLog::new();

    println!("Record blocks in {}", grid_path.display());
    println!("======================");
    println!();

    let mut scan = blocks(&grid, &config.layout);
    for block in scan.by_ref() {
        log.record_block(&block);
        match &block.outcome {
            Ok(record) => println!(
                "row {:>6}: {} / {} - {} temperature, {} light, {} timestamps",
                block.marker_row,
                record.target(),
                record.sensor_id(),
                record.temperature().len(),
                record.light().len(),
                record.timestamps().len()
            ),
            Err(reason) => println!("row {:>6}: discarded, {reason}", block.marker_row),
        }
    }
    log.record_rows_scanned(scan.rows_scanned() as u64);

    println!();
    println!("{}", log.summary());
    Ok(())
}

fn cmd_status(config: &Config) {
    println!("sensorgrid Status");
    println!("=================");
    println!();

    let stats_path = config.stats_path();
    if stats_path.exists() {
        let log = ExtractionLog::with_persistence(stats_path);
        println!("Cumulative {}", log.summary());
    } else {
        println!("No previous extraction data found.");
    }
}

fn cmd_config(config: &Config, path: Option<&Path>, save: bool) -> anyhow::Result<()> {
    let config_path = path.map_or_else(Config::config_path, Path::to_path_buf);

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", config_path);
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);

    if save {
        config
            .save_to(&config_path)
            .with_context(|| format!("writing config {}", config_path.display()))?;
        println!();
        println!("Saved to {:?}", config_path);
    }
    Ok(())
}
