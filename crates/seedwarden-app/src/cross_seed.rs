//! Import of `.torrent` files dropped by an external cross-seed tool.
//!
//! # Design
//! - Drop files are named `[tag][tracker]<original name>.torrent`; the
//!   fragment after the second `]` is matched as a substring against the
//!   aggregate's names.
//! - Only matches whose original is complete are admitted, paused, under the
//!   original's save path and category.
//! - Admitted files move to a processed subdirectory; unmatched files stay
//!   for manual review.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use seedwarden_telemetry::{RunMode, decision};
use seedwarden_torrent_core::{AddTorrentFile, TorrentClient};
use tracing::{error, info, warn};

use crate::aggregate::AggregatedView;
use crate::error::{AppError, AppResult, tolerate};

/// Subdirectory of the drop directory receiving imported files.
pub const PROCESSED_DIR_NAME: &str = "seedwarden_added";

const TORRENT_EXTENSION: &str = "torrent";

/// Outcome of one import pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossSeedReport {
    /// Files admitted to the client.
    pub added: usize,
    /// Files whose original torrent is not complete yet.
    pub incomplete: usize,
    /// Files with no matching torrent.
    pub not_found: usize,
    /// Files whose name lacks the expected structure.
    pub malformed: usize,
    /// Admissions or moves that failed.
    pub failed: usize,
    /// Files the client accepted that could not leave the drop directory;
    /// the next run would add them again.
    pub stranded: usize,
    /// Admitted files per category; empty key for uncategorized.
    pub by_category: BTreeMap<String, usize>,
}

/// Original-name fragment of a drop file: the text after the second `]`
/// and before the `.torrent` suffix.
#[must_use]
pub fn name_fragment(file_name: &str) -> Option<&str> {
    let mut parts = file_name.splitn(3, ']');
    parts.next()?;
    parts.next()?;
    let rest = parts.next()?;
    let fragment = rest
        .split_once(".torrent")
        .map_or(rest, |(head, _)| head);
    (!fragment.is_empty()).then_some(fragment)
}

fn drop_files(drop_dir: &Path) -> AppResult<Vec<PathBuf>> {
    let entries =
        fs::read_dir(drop_dir).map_err(|err| AppError::io("read_cross_seed_dir", drop_dir, err))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| AppError::io("read_cross_seed_dir", drop_dir, err))?;
        let path = entry.path();
        let is_torrent = path
            .extension()
            .is_some_and(|extension| extension == TORRENT_EXTENSION);
        if is_torrent && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Admit every dropped file in `drop_dir` that matches a complete torrent in `view`.
///
/// # Errors
///
/// Returns an error when the drop directory cannot be read, the processed
/// directory cannot be created, or the client connection fails.
pub async fn import_cross_seeds(
    client: &dyn TorrentClient,
    drop_dir: &Path,
    view: &AggregatedView,
    mode: RunMode,
) -> AppResult<CrossSeedReport> {
    let files = drop_files(drop_dir)?;
    let processed_dir = drop_dir.join(PROCESSED_DIR_NAME);
    if !mode.is_dry_run() {
        fs::create_dir_all(&processed_dir)
            .map_err(|err| AppError::io("create_processed_dir", &processed_dir, err))?;
    }

    let mut report = CrossSeedReport::default();
    for path in files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(fragment) = name_fragment(&file_name) else {
            warn!(file = %file_name, "cross-seed file name is missing the expected ']' delimiters; skipping");
            report.malformed += 1;
            continue;
        };
        let Some((name, entry)) = view.find_containing(fragment) else {
            warn!(fragment, "{fragment} not found in torrents.");
            report.not_found += 1;
            continue;
        };
        if !entry.is_complete {
            info!(
                torrent = name,
                drop_dir = %drop_dir.display(),
                "Found {name} in drop directory but original torrent is not complete. Not adding."
            );
            report.incomplete += 1;
            continue;
        }

        let category = entry.category.clone().unwrap_or_default();
        decision!(
            mode,
            torrent = name,
            category = %category,
            save_path = %entry.save_path,
            paused = true,
            "Adding {name} to the client"
        );
        report.added += 1;
        *report.by_category.entry(category).or_default() += 1;

        if mode.is_dry_run() {
            continue;
        }
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(file = %path.display(), error = %err, "failed to read cross-seed file");
                report.failed += 1;
                continue;
            }
        };
        let request = AddTorrentFile {
            file_name: file_name.clone(),
            bytes,
            save_path: entry.save_path.clone(),
            category: entry.category.clone(),
            paused: true,
        };
        let result = client.add_torrent(request).await;
        if tolerate("add_torrent", &file_name, result, &mut report.failed)? {
            if let Err(reason) = move_processed(&path, &processed_dir.join(&file_name)) {
                error!(
                    torrent = name,
                    file = %path.display(),
                    reason = %reason,
                    "torrent already added to the client but the drop file could not be moved; move it out of the drop directory by hand to avoid a duplicate add"
                );
                report.failed += 1;
                report.stranded += 1;
            }
        }
    }

    for (category, count) in &report.by_category {
        decision!(mode, category = %category, count, "{category} .torrents added: {count}");
    }
    decision!(
        mode,
        total = report.added,
        "Total .torrents added: {}",
        report.added
    );
    Ok(report)
}

fn move_processed(source: &Path, destination: &Path) -> io::Result<()> {
    if destination.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("processed file {} already exists", destination.display()),
        ));
    }
    fs::rename(source, destination)
}
