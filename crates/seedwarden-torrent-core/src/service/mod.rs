//! Collaborator trait implemented by torrent client adapters.

use async_trait::async_trait;

use crate::error::TorrentResult;
use crate::model::{AddTorrentFile, RemoveTorrent, TorrentRecord};

/// Read/write surface a torrent client must expose to the reconciliation engine.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Snapshot every torrent with trackers and files, newest first.
    async fn list_torrents(&self) -> TorrentResult<Vec<TorrentRecord>>;

    /// Assign a category to a torrent.
    async fn set_category(&self, hash: &str, category: &str) -> TorrentResult<()>;

    /// Add tags to a torrent, keeping existing ones.
    async fn add_tags(&self, hash: &str, tags: &[String]) -> TorrentResult<()>;

    /// Remove a torrent record, optionally deleting its payload.
    ///
    /// Removing a hash the client no longer knows is a no-op.
    async fn remove_torrent(&self, hash: &str, options: RemoveTorrent) -> TorrentResult<()>;

    /// Resume a paused torrent.
    async fn resume_torrent(&self, hash: &str) -> TorrentResult<()>;

    /// Force an integrity recheck of on-disk data.
    async fn recheck(&self, hash: &str) -> TorrentResult<()>;

    /// Admit a torrent from a metainfo file.
    async fn add_torrent(&self, request: AddTorrentFile) -> TorrentResult<()>;
}
