//! # Design
//!
//! - Centralize engine-level errors for bootstrap and orchestration.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Per-item client failures never become an `AppError`; only connection-level
//!   and configuration failures do.

use std::io;
use std::path::PathBuf;

use seedwarden_torrent_core::{TorrentError, TorrentResult};
use thiserror::Error;
use tracing::error;

/// Result alias for engine operations.
pub type AppResult<T> = Result<T, AppError>;

/// Engine-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading or prerequisite checks failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: seedwarden_config::ConfigError,
    },
    /// Torrent client failed at connection level.
    #[error("torrent client operation failed")]
    Torrent {
        /// Operation identifier.
        operation: &'static str,
        /// Source torrent error.
        source: TorrentError,
    },
    /// Orphan scan could not run.
    #[error("filesystem scan failed")]
    FsOps {
        /// Operation identifier.
        operation: &'static str,
        /// Source fsops error.
        source: seedwarden_fsops::FsOpsError,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Optional path involved in the failure.
        path: Option<PathBuf>,
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: seedwarden_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn torrent(operation: &'static str, source: TorrentError) -> Self {
        Self::Torrent { operation, source }
    }

    pub(crate) const fn fsops(
        operation: &'static str,
        source: seedwarden_fsops::FsOpsError,
    ) -> Self {
        Self::FsOps { operation, source }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: Some(path.into()),
            source,
        }
    }

    /// Whether the failure stems from configuration rather than runtime state.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

/// Absorb a per-item client failure: fatal errors propagate, others are
/// logged and counted. Returns whether the call succeeded.
pub(crate) fn tolerate(
    operation: &'static str,
    hash: &str,
    result: TorrentResult<()>,
    failed: &mut usize,
) -> AppResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.is_fatal() => Err(AppError::torrent(operation, err)),
        Err(err) => {
            error!(operation, hash, error = ?err, "client rejected mutation; continuing");
            *failed += 1;
            Ok(false)
        }
    }
}
