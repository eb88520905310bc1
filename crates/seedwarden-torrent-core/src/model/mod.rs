//! Core torrent domain types shared across the workspace.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Scheme prefix shared by `http` and `https` tracker announce URLs.
const HYPERTEXT_SCHEME: &str = "http";

/// Lifecycle state reported by the torrent client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentState {
    /// Client reported an error for the torrent.
    Error,
    /// Payload files are missing on disk.
    MissingFiles,
    /// Seeding with active peers.
    Uploading,
    /// Complete and paused (or stopped).
    PausedUp,
    /// Complete and waiting in the upload queue.
    QueuedUp,
    /// Complete and seeding without peers.
    StalledUp,
    /// Complete and being checked.
    CheckingUp,
    /// Complete and force-seeded.
    ForcedUp,
    /// Disk space is being allocated.
    Allocating,
    /// Downloading payload data.
    Downloading,
    /// Fetching metadata.
    MetaDownloading,
    /// Incomplete and paused (or stopped).
    PausedDl,
    /// Incomplete and waiting in the download queue.
    QueuedDl,
    /// Downloading without peers.
    StalledDl,
    /// Incomplete and being checked.
    CheckingDl,
    /// Force-downloaded.
    ForcedDl,
    /// Fast-resume data is being checked.
    CheckingResumeData,
    /// Payload is being relocated.
    Moving,
    /// State string not recognised.
    Unknown,
}

impl TorrentState {
    /// Map a client state string onto the enum. Unrecognised values become [`Self::Unknown`].
    #[must_use]
    pub fn from_client(value: &str) -> Self {
        match value {
            "error" => Self::Error,
            "missingFiles" => Self::MissingFiles,
            "uploading" => Self::Uploading,
            "pausedUP" | "stoppedUP" => Self::PausedUp,
            "queuedUP" => Self::QueuedUp,
            "stalledUP" => Self::StalledUp,
            "checkingUP" => Self::CheckingUp,
            "forcedUP" => Self::ForcedUp,
            "allocating" => Self::Allocating,
            "downloading" => Self::Downloading,
            "metaDL" | "forcedMetaDL" => Self::MetaDownloading,
            "pausedDL" | "stoppedDL" => Self::PausedDl,
            "queuedDL" => Self::QueuedDl,
            "stalledDL" => Self::StalledDl,
            "checkingDL" => Self::CheckingDl,
            "forcedDL" => Self::ForcedDl,
            "checkingResumeData" => Self::CheckingResumeData,
            "moving" => Self::Moving,
            _ => Self::Unknown,
        }
    }

    /// Whether the client considers the payload fully downloaded.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(
            self,
            Self::Uploading
                | Self::PausedUp
                | Self::QueuedUp
                | Self::StalledUp
                | Self::CheckingUp
                | Self::ForcedUp
        )
    }

    /// Whether the torrent is paused, regardless of completion.
    #[must_use]
    pub const fn is_paused(self) -> bool {
        matches!(self, Self::PausedUp | Self::PausedDl)
    }
}

/// Tracker entry attached to a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerEntry {
    /// Announce URL (DHT/PeX/LSD pseudo-trackers use non-URL markers).
    pub url: String,
    /// Last status message reported by the tracker; empty when healthy.
    pub message: String,
}

impl TrackerEntry {
    /// Construct a tracker entry.
    #[must_use]
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether the announce URL uses the `http`/`https` scheme.
    #[must_use]
    pub fn is_hypertext(&self) -> bool {
        self.url.starts_with(HYPERTEXT_SCHEME)
    }
}

/// Content file listed by a torrent, relative to its save path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFile {
    /// Path of the file relative to the torrent save path.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Snapshot of a torrent as reported by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentRecord {
    /// Info hash; the only unique identity.
    pub hash: String,
    /// Display name; shared by cross-seeded duplicates.
    pub name: String,
    /// Directory the payload is stored under.
    pub save_path: String,
    /// Lifecycle state.
    pub state: TorrentState,
    /// Download progress fraction in `[0, 1]`.
    pub progress: f64,
    /// Total selected payload size in bytes.
    pub size_bytes: u64,
    /// Current tags, possibly empty.
    pub tags: Vec<String>,
    /// Current category, `None` when unset.
    pub category: Option<String>,
    /// Trackers in client-reported order.
    pub trackers: Vec<TrackerEntry>,
    /// Payload files.
    pub files: Vec<TorrentFile>,
}

impl TorrentRecord {
    /// Trackers whose URL uses the hypertext scheme, in client order.
    pub fn hypertext_trackers(&self) -> impl Iterator<Item = &TrackerEntry> {
        self.trackers.iter().filter(|tracker| tracker.is_hypertext())
    }

    /// Message of the first hypertext tracker, `None` when the torrent has none.
    #[must_use]
    pub fn representative_message(&self) -> Option<&str> {
        self.hypertext_trackers()
            .next()
            .map(|tracker| tracker.message.as_str())
    }

    /// Whether the client reports the payload as complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Whether the torrent is currently paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Whether the torrent carries no tags.
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.tags.iter().all(|tag| tag.trim().is_empty())
    }

    /// Whether the torrent has no category assigned.
    #[must_use]
    pub fn is_uncategorized(&self) -> bool {
        self.category.as_deref().is_none_or(str::is_empty)
    }

    /// Absolute client-side paths of every payload file.
    pub fn content_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        let root = Path::new(&self.save_path);
        self.files.iter().map(move |file| root.join(&file.name))
    }
}

/// Request payload for adding a torrent from a metainfo file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTorrentFile {
    /// File name sent alongside the metainfo bytes.
    pub file_name: String,
    /// Bencoded metainfo payload.
    pub bytes: Vec<u8>,
    /// Directory the client should use for the payload.
    pub save_path: String,
    /// Category assigned on admission.
    pub category: Option<String>,
    /// Whether the torrent should be admitted paused.
    pub paused: bool,
}

/// Options controlling how the client removes torrents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RemoveTorrent {
    #[serde(default)]
    /// Whether to remove on-disk data alongside the torrent record.
    pub with_data: bool,
}

/// Shorten a tracker URL to its first three `/`-separated segments
/// (`https://tracker.example/announce/key` becomes `https://tracker.example`).
#[must_use]
pub fn truncate_url(url: &str) -> String {
    url.splitn(4, '/').take(3).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(trackers: Vec<TrackerEntry>) -> TorrentRecord {
        TorrentRecord {
            hash: "abc".to_string(),
            name: "Movie.2020".to_string(),
            save_path: "/data/Movies".to_string(),
            state: TorrentState::PausedDl,
            progress: 0.0,
            size_bytes: 10,
            tags: Vec::new(),
            category: None,
            trackers,
            files: vec![TorrentFile {
                name: "Movie.2020/movie.mkv".to_string(),
                size_bytes: 10,
            }],
        }
    }

    #[test]
    fn client_states_map_to_completion_and_pause() {
        assert!(TorrentState::from_client("stalledUP").is_complete());
        assert!(TorrentState::from_client("stoppedUP").is_complete());
        assert!(TorrentState::from_client("stoppedUP").is_paused());
        assert!(TorrentState::from_client("pausedDL").is_paused());
        assert!(!TorrentState::from_client("pausedDL").is_complete());
        assert_eq!(
            TorrentState::from_client("somethingNew"),
            TorrentState::Unknown
        );
    }

    #[test]
    fn representative_message_skips_pseudo_trackers() {
        let torrent = record(vec![
            TrackerEntry::new("** [DHT] **", "working"),
            TrackerEntry::new("https://a.example/announce", "Unregistered torrent"),
            TrackerEntry::new("https://b.example/announce", ""),
        ]);
        assert_eq!(
            torrent.representative_message(),
            Some("Unregistered torrent")
        );
        assert_eq!(torrent.hypertext_trackers().count(), 2);
    }

    #[test]
    fn representative_message_is_none_without_hypertext_tracker() {
        let torrent = record(vec![TrackerEntry::new("udp://tracker.example:80", "")]);
        assert_eq!(torrent.representative_message(), None);
    }

    #[test]
    fn content_paths_join_save_path() {
        let torrent = record(Vec::new());
        let paths: Vec<_> = torrent.content_paths().collect();
        assert_eq!(paths, vec![PathBuf::from("/data/Movies/Movie.2020/movie.mkv")]);
    }

    #[test]
    fn truncate_url_keeps_scheme_and_host() {
        assert_eq!(
            truncate_url("https://tracker.example/announce/passkey"),
            "https://tracker.example"
        );
        assert_eq!(truncate_url("http://short"), "http://short");
    }

    #[test]
    fn remove_options_default_keeps_data() -> Result<(), serde_json::Error> {
        let options: RemoveTorrent = serde_json::from_str("{}")?;
        assert!(!options.with_data);
        Ok(())
    }

    #[test]
    fn blank_tags_count_as_untagged() {
        let mut torrent = record(Vec::new());
        torrent.tags = vec![String::new()];
        assert!(torrent.is_untagged());
        torrent.category = Some(String::new());
        assert!(torrent.is_uncategorized());
    }
}
