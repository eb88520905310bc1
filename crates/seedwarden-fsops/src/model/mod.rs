//! Domain models for the orphaned-file scan.
//!
//! # Design
//! - Orphan paths are always expressed with the client-visible prefix so they
//!   compare directly with torrent content listings.
//! - The scan process may see the same tree under another prefix; the mapping
//!   converts between the two with a fixed prefix substitution.

use std::path::{Path, PathBuf};

use crate::error::{FsOpsError, FsOpsResult};

/// Reserved directory under the scan root that receives quarantined files.
pub const QUARANTINE_DIR_NAME: &str = "orphaned_data";

/// Prefix substitution between the client's view and the scanner's view of the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    client_root: PathBuf,
    scan_root: PathBuf,
}

impl PathMapping {
    /// Build a mapping; `scan_root` defaults to `client_root` when the
    /// scanning process sees the same paths as the client.
    #[must_use]
    pub fn new(client_root: impl Into<PathBuf>, scan_root: Option<PathBuf>) -> Self {
        let client_root = client_root.into();
        let scan_root = scan_root.unwrap_or_else(|| client_root.clone());
        Self {
            client_root,
            scan_root,
        }
    }

    /// Content root as the torrent client reports it.
    #[must_use]
    pub fn client_root(&self) -> &Path {
        &self.client_root
    }

    /// Content root as this process sees it.
    #[must_use]
    pub fn scan_root(&self) -> &Path {
        &self.scan_root
    }

    /// Quarantine directory on the scanner side.
    #[must_use]
    pub fn quarantine_dir(&self) -> PathBuf {
        self.scan_root.join(QUARANTINE_DIR_NAME)
    }

    /// Client-side form of the quarantine directory, for display.
    #[must_use]
    pub fn client_quarantine_dir(&self) -> PathBuf {
        self.client_root.join(QUARANTINE_DIR_NAME)
    }

    /// Translate a scanner-side path to its client-visible form.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::OutsideRoot`] if `path` is not under the scan root.
    pub fn to_client(&self, path: &Path) -> FsOpsResult<PathBuf> {
        self.relative_to_scan(path)
            .map(|relative| self.client_root.join(relative))
    }

    /// Translate a client-visible path to the scanner-side path.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::OutsideRoot`] if `path` is not under the client root.
    pub fn to_scan(&self, path: &Path) -> FsOpsResult<PathBuf> {
        self.relative_to_client(path)
            .map(|relative| self.scan_root.join(relative))
    }

    /// Quarantine destination mirroring a client-visible path's position under the root.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::OutsideRoot`] if `path` is not under the client root.
    pub fn quarantine_destination(&self, path: &Path) -> FsOpsResult<PathBuf> {
        self.relative_to_client(path)
            .map(|relative| self.quarantine_dir().join(relative))
    }

    fn relative_to_scan<'p>(&self, path: &'p Path) -> FsOpsResult<&'p Path> {
        path.strip_prefix(&self.scan_root)
            .map_err(|_| FsOpsError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.scan_root.clone(),
            })
    }

    fn relative_to_client<'p>(&self, path: &'p Path) -> FsOpsResult<&'p Path> {
        path.strip_prefix(&self.client_root)
            .map_err(|_| FsOpsError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.client_root.clone(),
            })
    }
}

/// Outcome of one orphan scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanReport {
    /// Files found under the scan root, quarantine excluded.
    pub scanned: usize,
    /// Distinct files referenced by any torrent.
    pub referenced: usize,
    /// Orphans in client-visible form, sorted.
    pub orphans: Vec<PathBuf>,
    /// Orphans moved into quarantine.
    pub moved: usize,
    /// Orphans left in place because the destination was occupied.
    pub conflicts: usize,
    /// Orphans left in place because the move failed.
    pub failed: usize,
    /// Empty directories removed after the moves.
    pub pruned_dirs: usize,
}
