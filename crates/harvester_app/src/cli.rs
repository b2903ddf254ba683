use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use harvester_engine::ExportFormat;

/// Harvests movie records from the remote catalog into a local dataset.
#[derive(Debug, Parser)]
#[command(name = "harvester", version, about)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one harvest and export the records.
    Scrape(ScrapeArgs),
    /// Show the current configuration and probe the catalog API.
    Config,
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Number of movies to harvest.
    #[arg(short, long, default_value_t = 1000)]
    pub count: u32,

    /// Concurrent requests (clamped to the supported ceiling).
    #[arg(long, default_value_t = 8)]
    pub concurrent: u32,

    /// Request adult content and emit the Adult column.
    #[arg(long)]
    pub include_adult: bool,

    /// Output file; defaults to movies.<ext> for the chosen format.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
    Xlsx,
    Sqlite,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Xlsx => ExportFormat::Xlsx,
            OutputFormat::Sqlite => ExportFormat::Sqlite,
        }
    }
}
