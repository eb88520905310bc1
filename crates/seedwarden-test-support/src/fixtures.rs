//! Builders for torrent snapshots used in tests.

use seedwarden_torrent_core::{TorrentFile, TorrentRecord, TorrentState, TrackerEntry};

/// Fluent builder for [`TorrentRecord`] fixtures.
///
/// Defaults describe a complete, seeding, untagged and uncategorized torrent
/// stored under `/data` with no trackers and no files.
#[derive(Debug, Clone)]
pub struct TorrentBuilder {
    record: TorrentRecord,
}

impl TorrentBuilder {
    /// Start a fixture with the given hash and display name.
    #[must_use]
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            record: TorrentRecord {
                hash: hash.into(),
                name: name.into(),
                save_path: "/data".to_string(),
                state: TorrentState::Uploading,
                progress: 1.0,
                size_bytes: 0,
                tags: Vec::new(),
                category: None,
                trackers: Vec::new(),
                files: Vec::new(),
            },
        }
    }

    /// Set the save path.
    #[must_use]
    pub fn save_path(mut self, path: impl Into<String>) -> Self {
        self.record.save_path = path.into();
        self
    }

    /// Set the lifecycle state.
    #[must_use]
    pub const fn state(mut self, state: TorrentState) -> Self {
        self.record.state = state;
        self
    }

    /// Set download progress.
    #[must_use]
    pub const fn progress(mut self, progress: f64) -> Self {
        self.record.progress = progress;
        self
    }

    /// Set the payload size.
    #[must_use]
    pub const fn size(mut self, size_bytes: u64) -> Self {
        self.record.size_bytes = size_bytes;
        self
    }

    /// Assign a category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.record.category = Some(category.into());
        self
    }

    /// Append a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.record.tags.push(tag.into());
        self
    }

    /// Append a tracker with its status message.
    #[must_use]
    pub fn tracker(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.record.trackers.push(TrackerEntry::new(url, message));
        self
    }

    /// Append a payload file relative to the save path.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>) -> Self {
        self.record.files.push(TorrentFile {
            name: name.into(),
            size_bytes: 0,
        });
        self
    }

    /// Finish the fixture.
    #[must_use]
    pub fn build(self) -> TorrentRecord {
        self.record
    }
}
