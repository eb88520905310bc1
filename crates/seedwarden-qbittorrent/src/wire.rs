//! Web API payloads. Field names follow the client's JSON.

use serde::Deserialize;
use seedwarden_torrent_core::{TorrentFile, TorrentRecord, TorrentState, TrackerEntry};

#[derive(Debug, Deserialize)]
pub(crate) struct WireTorrent {
    pub(crate) hash: String,
    pub(crate) name: String,
    #[serde(default)]
    save_path: String,
    #[serde(default)]
    progress: f64,
    #[serde(default)]
    state: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    size: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTracker {
    url: String,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFile {
    name: String,
    #[serde(default)]
    size: i64,
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

impl WireTorrent {
    pub(crate) fn into_record(self, trackers: Vec<WireTracker>, files: Vec<WireFile>) -> TorrentRecord {
        let tags = self
            .tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        let category = Some(self.category).filter(|category| !category.is_empty());

        TorrentRecord {
            hash: self.hash,
            name: self.name,
            save_path: self.save_path,
            state: TorrentState::from_client(&self.state),
            progress: self.progress,
            size_bytes: non_negative(self.size),
            tags,
            category,
            trackers: trackers
                .into_iter()
                .map(|tracker| TrackerEntry::new(tracker.url, tracker.msg))
                .collect(),
            files: files
                .into_iter()
                .map(|file| TorrentFile {
                    name: file.name,
                    size_bytes: non_negative(file.size),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_torrent_converts_tags_and_category() -> Result<(), serde_json::Error> {
        let torrent: WireTorrent = serde_json::from_str(
            r#"{"hash":"h1","name":"Show","save_path":"/data/TV","progress":1.0,
                "state":"stoppedUP","tags":"tl, cross-seed","category":"","size":-1}"#,
        )?;
        let trackers: Vec<WireTracker> = serde_json::from_str(
            r#"[{"url":"** [DHT] **","msg":""},{"url":"https://t.example/a","msg":"Working"}]"#,
        )?;
        let record = torrent.into_record(trackers, Vec::new());

        assert_eq!(record.tags, vec!["tl".to_string(), "cross-seed".to_string()]);
        assert!(record.category.is_none());
        assert!(record.is_paused());
        assert_eq!(record.size_bytes, 0);
        assert_eq!(record.representative_message(), Some("Working"));
        Ok(())
    }
}
