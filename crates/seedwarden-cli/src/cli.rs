//! Command-line surface: flags, defaults and their mapping onto a run.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use seedwarden_app::{Operations, RunOptions};
use seedwarden_config::DEFAULT_CONFIG_FILE;
use seedwarden_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, RunMode};

const DEFAULT_LOG_FILE: &str = "activity.log";

#[derive(Debug, Parser)]
#[command(
    name = "seedwarden",
    version,
    about = "Keeps a qBittorrent instance in line with declared category, tag and cleanup policy"
)]
pub(crate) struct Cli {
    /// Configuration file to load.
    #[arg(
        short = 'c',
        long = "config-file",
        env = "SEEDWARDEN_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub(crate) config_file: PathBuf,
    /// File mirroring the log output; pass an empty value to disable.
    #[arg(short = 'l', long = "log-file", default_value = DEFAULT_LOG_FILE)]
    pub(crate) log_file: String,
    /// Update categories and tags, remove unregistered torrents, and recheck/resume paused torrents.
    #[arg(short = 'm', long)]
    pub(crate) manage: bool,
    /// Add torrents from the cross-seed drop directory, then recheck/resume.
    #[arg(short = 's', long = "cross-seed")]
    pub(crate) cross_seed: bool,
    /// Recheck paused torrents sorted by lowest size; resume completed ones.
    #[arg(short = 'R', long)]
    pub(crate) recheck: bool,
    /// Set categories on uncategorized torrents.
    #[arg(short = 'g', long = "cat-update")]
    pub(crate) cat_update: bool,
    /// Add tags to untagged torrents.
    #[arg(short = 't', long = "tag-update")]
    pub(crate) tag_update: bool,
    /// Remove torrents their tracker reports as unregistered.
    #[arg(short = 'r', long = "rem-unregistered")]
    pub(crate) rem_unregistered: bool,
    /// Move files under `root_dir` that no torrent references into `orphaned_data`.
    #[arg(short = 'o', long = "rem-orphaned")]
    pub(crate) rem_orphaned: bool,
    /// Log every decision without moving, deleting, tagging or categorizing anything.
    #[arg(long = "dry-run")]
    pub(crate) dry_run: bool,
    /// Log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long = "log", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    /// Log line format.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormatArg::Text)]
    pub(crate) log_format: LogFormatArg,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    #[default]
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

impl Cli {
    pub(crate) fn operations(&self) -> Operations {
        let selected = Operations {
            categorize: self.cat_update,
            tag: self.tag_update,
            retire_unregistered: self.rem_unregistered,
            import_cross_seed: self.cross_seed,
            recheck_resume: self.recheck,
            orphan_scan: self.rem_orphaned,
        };
        if self.manage {
            selected.union(Operations::manage())
        } else {
            selected
        }
    }

    pub(crate) fn log_file_path(&self) -> Option<PathBuf> {
        let trimmed = self.log_file.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    pub(crate) fn run_options(&self) -> RunOptions {
        RunOptions {
            config_path: self.config_file.clone(),
            operations: self.operations(),
            mode: RunMode::from_dry_run(self.dry_run),
        }
    }
}
