//! Operation selection and fixed-order execution of the reconciliation passes.
//!
//! # Design
//! - Each pass takes a fresh listing so it sees the effects of earlier passes.
//! - Aggregates are rebuilt from that listing before any decision is made.
//! - A listing failure aborts the run; per-item failures only increment counters.

use seedwarden_config::{AppConfig, Requirement, ensure_requirements};
use seedwarden_fsops::{OrphanReport, OrphanScanner, PathMapping};
use seedwarden_telemetry::RunMode;
use seedwarden_torrent_core::{TorrentClient, TorrentRecord};
use tracing::{debug, info};

use crate::aggregate::AggregatedView;
use crate::classify::{UpdateReport, update_categories, update_tags};
use crate::cross_seed::{CrossSeedReport, import_cross_seeds};
use crate::error::{AppError, AppResult};
use crate::recheck::{RecheckReport, recheck_paused};
use crate::retire::{RetireReport, retire_unregistered};

/// Passes requested for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Operations {
    /// Assign categories to uncategorized torrents.
    pub categorize: bool,
    /// Tag untagged torrents.
    pub tag: bool,
    /// Remove unregistered torrents.
    pub retire_unregistered: bool,
    /// Import cross-seed drop files.
    pub import_cross_seed: bool,
    /// Resume or recheck paused torrents.
    pub recheck_resume: bool,
    /// Quarantine orphaned files.
    pub orphan_scan: bool,
}

impl Operations {
    /// Routine maintenance: categorize, tag, retire and recheck/resume.
    #[must_use]
    pub const fn manage() -> Self {
        Self {
            categorize: true,
            tag: true,
            retire_unregistered: true,
            import_cross_seed: false,
            recheck_resume: true,
            orphan_scan: false,
        }
    }

    /// Union of two selections.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            categorize: self.categorize || other.categorize,
            tag: self.tag || other.tag,
            retire_unregistered: self.retire_unregistered || other.retire_unregistered,
            import_cross_seed: self.import_cross_seed || other.import_cross_seed,
            recheck_resume: self.recheck_resume || other.recheck_resume,
            orphan_scan: self.orphan_scan || other.orphan_scan,
        }
    }

    /// Selection with implied passes added: an import is followed by recheck/resume.
    #[must_use]
    pub const fn resolved(mut self) -> Self {
        if self.import_cross_seed {
            self.recheck_resume = true;
        }
        self
    }

    /// Whether any pass is selected.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.categorize
            || self.tag
            || self.retire_unregistered
            || self.import_cross_seed
            || self.recheck_resume
            || self.orphan_scan
    }

    /// Configuration fields the selected passes need.
    #[must_use]
    pub fn requirements(&self) -> Vec<Requirement> {
        let mut requirements = Vec::new();
        if self.import_cross_seed {
            requirements.push(Requirement::CrossSeedDir);
        }
        if self.orphan_scan {
            requirements.push(Requirement::RootDir);
        }
        requirements
    }
}

/// Reports of the passes that ran; `None` for passes not selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Category update pass.
    pub categories: Option<UpdateReport>,
    /// Tag update pass.
    pub tags: Option<UpdateReport>,
    /// Unregistered-torrent retirement.
    pub retired: Option<RetireReport>,
    /// Cross-seed import.
    pub cross_seed: Option<CrossSeedReport>,
    /// Resume/recheck pass.
    pub recheck: Option<RecheckReport>,
    /// Orphaned-file scan.
    pub orphans: Option<OrphanReport>,
}

impl RunSummary {
    /// Per-item failures across all passes.
    #[must_use]
    pub fn failed_items(&self) -> usize {
        self.categories.map_or(0, |r| r.failed)
            + self.tags.map_or(0, |r| r.failed)
            + self.retired.map_or(0, |r| r.failed)
            + self.cross_seed.as_ref().map_or(0, |r| r.failed)
            + self.recheck.map_or(0, |r| r.failed)
            + self
                .orphans
                .as_ref()
                .map_or(0, |r| r.failed + r.conflicts)
    }
}

/// Runs the selected passes against one client and configuration.
pub struct Reconciler<'a> {
    client: &'a dyn TorrentClient,
    config: &'a AppConfig,
    mode: RunMode,
}

impl<'a> Reconciler<'a> {
    /// Bind the engine to its collaborators.
    #[must_use]
    pub const fn new(client: &'a dyn TorrentClient, config: &'a AppConfig, mode: RunMode) -> Self {
        Self {
            client,
            config,
            mode,
        }
    }

    async fn snapshot(&self, operation: &'static str) -> AppResult<Vec<TorrentRecord>> {
        let torrents = self
            .client
            .list_torrents()
            .await
            .map_err(|err| AppError::torrent(operation, err))?;
        debug!(operation, count = torrents.len(), "torrent snapshot taken");
        Ok(torrents)
    }

    fn aggregate(&self, torrents: &[TorrentRecord]) -> AggregatedView {
        AggregatedView::build(torrents, &self.config.categories)
    }

    /// Execute the selected passes in order: categorize, tag, retire,
    /// import, recheck/resume, orphan scan.
    ///
    /// # Errors
    ///
    /// Returns an error when a required directory is not configured, the
    /// client connection fails, or the orphan scan root cannot be read.
    pub async fn run(&self, operations: Operations) -> AppResult<RunSummary> {
        let operations = operations.resolved();
        ensure_requirements(self.config, &operations.requirements())
            .map_err(|err| AppError::config("ensure_requirements", err))?;
        let mut summary = RunSummary::default();

        if operations.categorize {
            let torrents = self.snapshot("categorize").await?;
            summary.categories = Some(
                update_categories(self.client, &torrents, &self.config.categories, self.mode)
                    .await?,
            );
        }

        if operations.tag {
            let torrents = self.snapshot("tag").await?;
            summary.tags =
                Some(update_tags(self.client, &torrents, &self.config.tags, self.mode).await?);
        }

        if operations.retire_unregistered {
            let torrents = self.snapshot("retire_unregistered").await?;
            let view = self.aggregate(&torrents);
            summary.retired =
                Some(retire_unregistered(self.client, &torrents, &view, self.mode).await?);
        }

        if operations.import_cross_seed
            && let Some(drop_dir) = self.config.directory.cross_seed.as_deref()
        {
            let torrents = self.snapshot("import_cross_seed").await?;
            let view = self.aggregate(&torrents);
            summary.cross_seed =
                Some(import_cross_seeds(self.client, drop_dir, &view, self.mode).await?);
        }

        if operations.recheck_resume {
            let torrents = self.snapshot("recheck_resume").await?;
            let view = self.aggregate(&torrents);
            summary.recheck = Some(
                recheck_paused(self.client, &torrents, &view, &self.config.tags, self.mode)
                    .await?,
            );
        }

        if operations.orphan_scan
            && let Some(root_dir) = self.config.directory.root_dir.as_deref()
        {
            let torrents = self.snapshot("orphan_scan").await?;
            let mapping = PathMapping::new(root_dir, self.config.directory.remote_dir.clone());
            let scanner = OrphanScanner::new(mapping, self.mode);
            summary.orphans = Some(
                scanner
                    .run(&torrents)
                    .map_err(|err| AppError::fsops("orphan_scan", err))?,
            );
        }

        info!(
            dry_run = self.mode.is_dry_run(),
            failed_items = summary.failed_items(),
            "reconciliation run finished"
        );
        Ok(summary)
    }
}
