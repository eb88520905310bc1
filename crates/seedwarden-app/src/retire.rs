//! Removal of torrents their tracker no longer recognizes.

use seedwarden_telemetry::{RunMode, decision};
use seedwarden_torrent_core::{
    RemoveTorrent, TorrentClient, TorrentRecord, TrackerEntry, truncate_url,
};

use crate::aggregate::AggregatedView;
use crate::error::{AppResult, tolerate};

/// Tracker status fragments that mark a torrent as unregistered (case-sensitive).
pub const UNREGISTERED_MARKERS: [&str; 3] = [
    "Unregistered torrent",
    "Torrent is not found",
    "Torrent not registered",
];

/// How an unregistered torrent is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    /// Remove the client record; a healthy duplicate still uses the files.
    RecordOnly,
    /// Remove the client record and its content files.
    RecordAndData,
}

impl Retirement {
    /// Whether content files are deleted along with the record.
    #[must_use]
    pub const fn removes_data(self) -> bool {
        matches!(self, Self::RecordAndData)
    }

    /// Decide whether and how `torrent` should be retired.
    ///
    /// Only the first hypertext tracker carrying an unregistered marker is
    /// considered, so a torrent yields at most one decision.
    #[must_use]
    pub fn decide<'t>(
        torrent: &'t TorrentRecord,
        view: &AggregatedView,
    ) -> Option<(Self, &'t TrackerEntry)> {
        let tracker = torrent
            .hypertext_trackers()
            .find(|tracker| is_unregistered(&tracker.message))?;
        let shared = view
            .get(&torrent.name)
            .is_some_and(|entry| entry.duplicate_count > 1 && entry.has_healthy_duplicate());
        let retirement = if shared {
            Self::RecordOnly
        } else {
            Self::RecordAndData
        };
        Some((retirement, tracker))
    }
}

fn is_unregistered(message: &str) -> bool {
    UNREGISTERED_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Outcome of one retirement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetireReport {
    /// Torrents whose record was removed and files kept.
    pub record_only: usize,
    /// Torrents removed together with their files.
    pub with_data: usize,
    /// Removals the client rejected.
    pub failed: usize,
}

/// Retire every unregistered torrent in `torrents`.
///
/// `view` must be built from the same listing so every duplicate is counted
/// before any decision is taken.
///
/// # Errors
///
/// Returns an error only when the client connection fails; rejected removals
/// are logged and counted.
pub async fn retire_unregistered(
    client: &dyn TorrentClient,
    torrents: &[TorrentRecord],
    view: &AggregatedView,
    mode: RunMode,
) -> AppResult<RetireReport> {
    let mut report = RetireReport::default();

    for torrent in torrents {
        let Some((retirement, tracker)) = Retirement::decide(torrent, view) else {
            continue;
        };
        let tracker_url = truncate_url(&tracker.url);
        if retirement.removes_data() {
            report.with_data += 1;
            decision!(
                mode,
                torrent = %torrent.name,
                status = %tracker.message,
                tracker = %tracker_url,
                "Deleted .torrent AND content files."
            );
        } else {
            report.record_only += 1;
            decision!(
                mode,
                torrent = %torrent.name,
                status = %tracker.message,
                tracker = %tracker_url,
                "Deleted .torrent but not content files."
            );
        }

        if !mode.is_dry_run() {
            let options = RemoveTorrent {
                with_data: retirement.removes_data(),
            };
            let result = client.remove_torrent(&torrent.hash, options).await;
            tolerate("remove_torrent", &torrent.hash, result, &mut report.failed)?;
        }
    }

    if report.record_only + report.with_data == 0 {
        decision!(mode, "No unregistered torrents found.");
    } else {
        decision!(
            mode,
            record_only = report.record_only,
            with_data = report.with_data,
            "Deleted {} .torrent(s) but not content files; deleted {} .torrent(s) AND content files.",
            report.record_only,
            report.with_data
        );
    }
    Ok(report)
}
