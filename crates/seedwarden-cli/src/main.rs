//! Binary entrypoint: parse flags, install logging, run the reconciliation
//! passes and map failures onto exit codes.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

mod cli;
mod error;

use std::process;

use clap::Parser;
use seedwarden_app::{RunSummary, run_app};
use seedwarden_telemetry::{LoggingConfig, init_logging};
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli).await {
        eprintln!("error: {}", err.display_message());
        process::exit(err.exit_code());
    }
}

async fn run(cli: &Cli) -> CliResult<()> {
    let log_file = cli.log_file_path();
    let _guard = init_logging(&LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.into(),
        log_file: log_file.as_deref(),
    })
    .map_err(CliError::failure)?;

    match run_app(&cli.run_options()).await {
        Ok(summary) => {
            log_summary(&summary);
            Ok(())
        }
        Err(err) => {
            let err = CliError::from_app(err);
            error!(exit_code = err.exit_code(), "{}", err.display_message());
            Err(err)
        }
    }
}

fn log_summary(summary: &RunSummary) {
    if let Some(report) = summary.categories {
        info!(updated = report.updated, unmatched = report.unmatched, failed = report.failed, "category pass");
    }
    if let Some(report) = summary.tags {
        info!(updated = report.updated, unmatched = report.unmatched, failed = report.failed, "tag pass");
    }
    if let Some(report) = summary.retired {
        info!(
            record_only = report.record_only,
            with_data = report.with_data,
            failed = report.failed,
            "unregistered pass"
        );
    }
    if let Some(report) = &summary.cross_seed {
        info!(
            added = report.added,
            incomplete = report.incomplete,
            not_found = report.not_found,
            malformed = report.malformed,
            stranded = report.stranded,
            failed = report.failed,
            "cross-seed pass"
        );
    }
    if let Some(report) = summary.recheck {
        info!(
            resumed = report.resumed,
            rechecked = report.rechecked,
            untouched = report.untouched,
            failed = report.failed,
            "recheck pass"
        );
    }
    if let Some(report) = &summary.orphans {
        info!(
            orphans = report.orphans.len(),
            moved = report.moved,
            conflicts = report.conflicts,
            pruned_dirs = report.pruned_dirs,
            "orphan pass"
        );
    }
    let failed = summary.failed_items();
    if failed > 0 {
        warn!(failed, "some items could not be processed; see errors above");
    }
}
