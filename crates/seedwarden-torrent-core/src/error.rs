//! Error types for torrent client operations.
//!
//! # Design
//! - Separate connection-level failures (fatal for a run) from per-torrent
//!   operation failures (logged and skipped by callers).
//! - Keep messages constant; carry operation and hash as fields.

use std::error::Error;

use thiserror::Error;

/// Primary error type for torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentError {
    /// The client could not be reached or refused the session.
    #[error("torrent client connection failed")]
    Connection {
        /// Operation identifier.
        operation: &'static str,
        /// Human-readable detail from the transport or the client.
        detail: String,
        /// Underlying failure when available.
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    /// The client rejected a mutation for a single torrent.
    #[error("torrent operation failed")]
    OperationFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Torrent hash when available.
        hash: Option<String>,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The client answered with a payload that could not be interpreted.
    #[error("torrent client response invalid")]
    InvalidResponse {
        /// Operation identifier.
        operation: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
    },
}

impl TorrentError {
    /// Whether the error invalidates the whole session rather than one item.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::InvalidResponse { .. })
    }

    /// Operation identifier carried by every variant.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Connection { operation, .. }
            | Self::OperationFailed { operation, .. }
            | Self::InvalidResponse { operation, .. } => operation,
        }
    }
}

/// Convenience alias for torrent operation results.
pub type TorrentResult<T> = Result<T, TorrentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn connection_failures_are_fatal() {
        let err = TorrentError::Connection {
            operation: "login",
            detail: "refused".to_string(),
            source: None,
        };
        assert!(err.is_fatal());
        assert_eq!(err.operation(), "login");
    }

    #[test]
    fn operation_failures_are_per_item() {
        let err = TorrentError::OperationFailed {
            operation: "resume",
            hash: Some("abc".to_string()),
            source: Box::new(io::Error::other("gone")),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "torrent operation failed");
    }
}
