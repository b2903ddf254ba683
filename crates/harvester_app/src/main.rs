//! Line-mode CLI front end for the movie catalog harvester.

mod cli;
mod progress;
mod summary;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use harvester_core::{CancelFlag, HarvestStatus, HarvestTarget};
use harvester_engine::{
    env_flag, export_records, load_dotenv, CatalogTransport, Credentials, ExportFormat,
    Harvester, TmdbTransport, TransportSettings, INCLUDE_ADULT_VAR,
};

use crate::cli::{Cli, Command, ScrapeArgs};
use crate::progress::CliProgress;

fn main() -> ExitCode {
    load_dotenv();
    let cli = Cli::parse();
    engine_logging::initialize_terminal(cli.log_level());

    let result = match cli.command {
        Command::Scrape(ref args) => run_scrape(args, cli.quiet),
        Command::Config => run_config(),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_scrape(args: &ScrapeArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    let creds = Credentials::from_env()?;
    let include_adult = args.include_adult || env_flag(INCLUDE_ADULT_VAR, false);
    let target = HarvestTarget::new(args.count, args.concurrent, include_adult);
    let format = ExportFormat::from(args.format);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("movies.{}", format.extension())));

    log::info!(
        "Harvesting {} movies with {} concurrent requests",
        target.target_count(),
        target.concurrency()
    );
    if include_adult {
        log::info!("Including adult content");
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let report = runtime.block_on(async {
        let transport = TmdbTransport::new(creds, TransportSettings::default(), target)?;
        let cancel = CancelFlag::new();
        progress::install_ctrl_c(cancel.clone());
        let sink = CliProgress::new(target.target_count(), quiet, cancel);
        let report = Harvester::new(transport, target).run(&sink).await;
        sink.finish();
        anyhow::Ok(report)
    })?;

    match &report.status {
        HarvestStatus::Errored { reason } => {
            log::error!("Harvest failed: {reason}");
            return Ok(ExitCode::FAILURE);
        }
        HarvestStatus::Cancelled => {
            log::warn!(
                "Harvest cancelled with {} records accumulated",
                report.records.len()
            );
        }
        HarvestStatus::Completed => {}
    }

    if report.records.is_empty() {
        log::error!("No movies were harvested; check your API key and connection.");
        return Ok(ExitCode::FAILURE);
    }

    let export = export_records(&report.records, format, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("Saved {} records to {}", export.rows, export.path.display());

    if report.skipped > 0 {
        log::warn!(
            "{} of {} requested movies skipped due to catalog limits",
            report.skipped,
            target.target_count()
        );
    }
    summary::print_summary(&summary::summarize(&report.records));

    Ok(ExitCode::SUCCESS)
}

fn run_config() -> anyhow::Result<ExitCode> {
    log::info!("Current configuration:");

    let creds = match Credentials::from_env() {
        Ok(creds) => creds,
        Err(err) => {
            log::error!("  API key: not configured ({err})");
            return Ok(ExitCode::FAILURE);
        }
    };
    log::info!("  API key: {}", creds.masked());
    log::info!("  Include adult: {}", env_flag(INCLUDE_ADULT_VAR, false));

    log::info!("Probing the catalog API...");
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let probe = runtime.block_on(async {
        let target = HarvestTarget::new(1, 1, false);
        let transport = TmdbTransport::new(creds, TransportSettings::default(), target)?;
        transport.fetch_categories().await
    });

    match probe {
        Ok(categories) => {
            log::info!("Connection OK; {} categories available", categories.len());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            log::error!("Connection failed: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
