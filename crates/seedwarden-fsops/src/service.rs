//! Orphaned-file detection: diff the client's content listing against the
//! filesystem, quarantine the difference, prune emptied directories.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use seedwarden_telemetry::{RunMode, decision};
use seedwarden_torrent_core::TorrentRecord;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};
use crate::model::{OrphanReport, PathMapping};

/// Scans a managed root for files no torrent references and moves them into quarantine.
#[derive(Debug, Clone)]
pub struct OrphanScanner {
    mapping: PathMapping,
    mode: RunMode,
}

impl OrphanScanner {
    /// Construct a scanner for the given root mapping.
    #[must_use]
    pub const fn new(mapping: PathMapping, mode: RunMode) -> Self {
        Self { mapping, mode }
    }

    /// Root mapping used by this scanner.
    #[must_use]
    pub const fn mapping(&self) -> &PathMapping {
        &self.mapping
    }

    /// Enumerate every file under the scan root, quarantine excluded, in client-visible form.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan root itself cannot be read. Unreadable
    /// entries below the root are logged and skipped.
    pub fn scan_files(&self) -> FsOpsResult<BTreeSet<PathBuf>> {
        let scan_root = self.mapping.scan_root();
        let quarantine = self.mapping.quarantine_dir();
        let mut files = BTreeSet::new();

        let walker = WalkDir::new(scan_root)
            .into_iter()
            .filter_entry(|entry| entry.path() != quarantine);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(FsOpsError::walkdir("scan_files", scan_root, err));
                }
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry during orphan scan");
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            files.insert(self.mapping.to_client(entry.path())?);
        }

        Ok(files)
    }

    /// Run the full detect, quarantine and prune pass against `torrents`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan root cannot be enumerated or the
    /// quarantine directory cannot be created. Per-file move failures are
    /// logged and counted instead.
    pub fn run(&self, torrents: &[TorrentRecord]) -> FsOpsResult<OrphanReport> {
        let scanned = self.scan_files()?;
        let referenced = referenced_files(torrents);
        let orphans = find_orphans(&scanned, &referenced);
        let mut report = OrphanReport {
            scanned: scanned.len(),
            referenced: referenced.len(),
            orphans,
            ..OrphanReport::default()
        };

        if report.orphans.is_empty() {
            decision!(self.mode, "No orphaned files found.");
            return Ok(report);
        }

        let destination = self.mapping.client_quarantine_dir();
        decision!(
            self.mode,
            count = report.orphans.len(),
            "{} orphaned files found",
            report.orphans.len()
        );
        for orphan in &report.orphans {
            decision!(self.mode, path = %orphan.display(), "orphaned file");
        }
        decision!(
            self.mode,
            count = report.orphans.len(),
            destination = %destination.display(),
            "moving orphaned files to quarantine"
        );

        if !self.mode.is_dry_run() {
            let quarantine = self.mapping.quarantine_dir();
            fs::create_dir_all(&quarantine)
                .map_err(|source| FsOpsError::io("create_quarantine", &quarantine, source))?;
        }

        for orphan in &report.orphans {
            match self.quarantine(orphan) {
                Ok(true) => report.moved += 1,
                Ok(false) => {}
                Err(FsOpsError::DestinationExists {
                    source_path,
                    destination,
                }) => {
                    error!(
                        path = %source_path.display(),
                        destination = %destination.display(),
                        "quarantine destination already exists; leaving file in place"
                    );
                    report.conflicts += 1;
                }
                Err(err) => {
                    error!(path = %orphan.display(), error = ?err, "failed to quarantine orphaned file");
                    report.failed += 1;
                }
            }
        }

        if self.mode.is_dry_run() {
            return Ok(report);
        }

        report.pruned_dirs = prune_empty_dirs(self.mapping.scan_root());
        info!(
            moved = report.moved,
            conflicts = report.conflicts,
            failed = report.failed,
            pruned_dirs = report.pruned_dirs,
            "Moved {} orphaned files to {}",
            report.moved,
            destination.display()
        );
        Ok(report)
    }

    /// Move one orphan into quarantine. Occupied destinations are reported in
    /// both modes; `Ok(false)` means the move was skipped for a dry run.
    fn quarantine(&self, orphan: &Path) -> FsOpsResult<bool> {
        let source = self.mapping.to_scan(orphan)?;
        let destination = self.mapping.quarantine_destination(orphan)?;
        if fs::symlink_metadata(&destination).is_ok() {
            return Err(FsOpsError::DestinationExists {
                source_path: source,
                destination,
            });
        }
        if self.mode.is_dry_run() {
            return Ok(false);
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| FsOpsError::io("create_quarantine_parent", parent, err))?;
        }
        move_file(&source, &destination)?;
        debug!(
            source = %source.display(),
            destination = %destination.display(),
            "orphaned file quarantined"
        );
        Ok(true)
    }
}

/// Client-visible paths of every file referenced by any torrent.
#[must_use]
pub fn referenced_files(torrents: &[TorrentRecord]) -> BTreeSet<PathBuf> {
    torrents
        .iter()
        .flat_map(TorrentRecord::content_paths)
        .collect()
}

/// Exact set difference `scanned - referenced`, sorted.
#[must_use]
pub fn find_orphans(scanned: &BTreeSet<PathBuf>, referenced: &BTreeSet<PathBuf>) -> Vec<PathBuf> {
    scanned.difference(referenced).cloned().collect()
}

/// Remove every empty directory below `root`, deepest first, so parents
/// emptied by the removal go in the same pass. Returns the number removed.
#[must_use]
pub fn prune_empty_dirs(root: &Path) -> usize {
    let mut directories: Vec<_> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .collect();
    directories.sort_by_key(walkdir::DirEntry::depth);
    directories.reverse();

    let mut removed = 0usize;
    for entry in directories {
        let empty = entry
            .path()
            .read_dir()
            .map(|mut iter| iter.next().is_none())
            .unwrap_or(false);
        if empty && fs::remove_dir(entry.path()).is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Move `source` to `destination` without ever replacing an existing file.
///
/// A hard link claims the destination atomically; crossing filesystems falls
/// back to copying into a freshly created file.
fn move_file(source: &Path, destination: &Path) -> FsOpsResult<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(destination_exists(source, destination));
        }
        Err(link_err) => {
            debug!(
                source = %source.display(),
                error = %link_err,
                "hard link failed; falling back to copy"
            );
            copy_new(source, destination)?;
        }
    }
    fs::remove_file(source).map_err(|err| FsOpsError::io("remove_orphan", source, err))
}

fn copy_new(source: &Path, destination: &Path) -> FsOpsResult<()> {
    let mut reader =
        File::open(source).map_err(|err| FsOpsError::io("open_orphan", source, err))?;
    let mut writer = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(destination_exists(source, destination));
        }
        Err(err) => return Err(FsOpsError::io("create_quarantine_file", destination, err)),
    };

    if let Err(err) = io::copy(&mut reader, &mut writer) {
        drop(writer);
        if let Err(cleanup) = fs::remove_file(destination) {
            warn!(
                destination = %destination.display(),
                error = %cleanup,
                "failed to remove partial quarantine copy"
            );
        }
        return Err(FsOpsError::io("copy_orphan", source, err));
    }
    if let Ok(metadata) = reader.metadata()
        && let Err(err) = writer.set_permissions(metadata.permissions())
    {
        debug!(destination = %destination.display(), error = %err, "permissions not copied");
    }
    Ok(())
}

fn destination_exists(source: &Path, destination: &Path) -> FsOpsError {
    FsOpsError::DestinationExists {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedwarden_test_support::fixtures::TorrentBuilder;
    use tempfile::TempDir;

    fn write(path: &Path) -> FsOpsResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| FsOpsError::io("test", parent, err))?;
        }
        fs::write(path, b"data").map_err(|err| FsOpsError::io("test", path, err))
    }

    #[test]
    fn find_orphans_is_set_difference() {
        let scanned: BTreeSet<PathBuf> = ["/r/a", "/r/b", "/r/c"].iter().map(PathBuf::from).collect();
        let referenced: BTreeSet<PathBuf> = ["/r/b", "/r/z"].iter().map(PathBuf::from).collect();
        assert_eq!(
            find_orphans(&scanned, &referenced),
            vec![PathBuf::from("/r/a"), PathBuf::from("/r/c")]
        );
    }

    #[test]
    fn referenced_files_union_all_torrents() {
        let torrents = vec![
            TorrentBuilder::new("a", "Show")
                .save_path("/data/TV/")
                .file("Show/ep1.mkv")
                .build(),
            TorrentBuilder::new("b", "Show")
                .save_path("/data/TV")
                .file("Show/ep1.mkv")
                .file("Show/ep2.mkv")
                .build(),
        ];
        let referenced = referenced_files(&torrents);
        assert_eq!(referenced.len(), 2);
        assert!(referenced.contains(Path::new("/data/TV/Show/ep2.mkv")));
    }

    #[test]
    fn scan_skips_quarantine_directory() -> FsOpsResult<()> {
        let temp = TempDir::new().map_err(|err| FsOpsError::io("tempdir", ".", err))?;
        let root = temp.path().to_path_buf();
        write(&root.join("Show/ep1.mkv"))?;
        write(&root.join("orphaned_data/Old/extra.nfo"))?;

        let scanner = OrphanScanner::new(PathMapping::new(&root, None), RunMode::Live);
        let files = scanner.scan_files()?;
        assert_eq!(files.len(), 1);
        assert!(files.contains(&root.join("Show/ep1.mkv")));
        Ok(())
    }

    #[test]
    fn scan_of_missing_root_fails() {
        let scanner = OrphanScanner::new(
            PathMapping::new("/definitely/missing/root", None),
            RunMode::Live,
        );
        assert!(matches!(
            scanner.scan_files(),
            Err(FsOpsError::Walkdir { .. })
        ));
    }

    #[test]
    fn prune_removes_nested_empty_directories() -> FsOpsResult<()> {
        let temp = TempDir::new().map_err(|err| FsOpsError::io("tempdir", ".", err))?;
        let root = temp.path();
        fs::create_dir_all(root.join("a/b/c")).map_err(|err| FsOpsError::io("t", root, err))?;
        write(&root.join("keep/file.txt"))?;

        assert_eq!(prune_empty_dirs(root), 3);
        assert!(!root.join("a").exists());
        assert!(root.join("keep/file.txt").exists());
        assert!(root.exists());
        Ok(())
    }

    #[test]
    fn move_never_replaces_existing_destination() -> FsOpsResult<()> {
        let temp = TempDir::new().map_err(|err| FsOpsError::io("tempdir", ".", err))?;
        let source = temp.path().join("extra.nfo");
        let destination = temp.path().join("quarantine/extra.nfo");
        write(&source)?;
        fs::create_dir_all(temp.path().join("quarantine"))
            .map_err(|err| FsOpsError::io("t", temp.path(), err))?;
        fs::write(&destination, b"keep").map_err(|err| FsOpsError::io("t", &destination, err))?;

        assert!(matches!(
            move_file(&source, &destination),
            Err(FsOpsError::DestinationExists { .. })
        ));
        assert!(source.exists());
        let kept = fs::read(&destination).map_err(|err| FsOpsError::io("t", &destination, err))?;
        assert_eq!(kept, b"keep");
        Ok(())
    }

    #[test]
    fn copy_fallback_refuses_existing_destination() -> FsOpsResult<()> {
        let temp = TempDir::new().map_err(|err| FsOpsError::io("tempdir", ".", err))?;
        let source = temp.path().join("extra.nfo");
        let destination = temp.path().join("taken.nfo");
        write(&source)?;
        fs::write(&destination, b"keep").map_err(|err| FsOpsError::io("t", &destination, err))?;

        assert!(matches!(
            copy_new(&source, &destination),
            Err(FsOpsError::DestinationExists { .. })
        ));
        let kept = fs::read(&destination).map_err(|err| FsOpsError::io("t", &destination, err))?;
        assert_eq!(kept, b"keep");
        Ok(())
    }

    #[test]
    fn copy_fallback_creates_fresh_destination() -> FsOpsResult<()> {
        let temp = TempDir::new().map_err(|err| FsOpsError::io("tempdir", ".", err))?;
        let source = temp.path().join("extra.nfo");
        let destination = temp.path().join("copied.nfo");
        write(&source)?;

        copy_new(&source, &destination)?;
        let copied = fs::read(&destination).map_err(|err| FsOpsError::io("t", &destination, err))?;
        assert_eq!(copied, b"data");
        Ok(())
    }
}
