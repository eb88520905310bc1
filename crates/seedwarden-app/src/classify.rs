//! Category and tag update passes over unlabelled torrents.

use seedwarden_config::RuleList;
use seedwarden_telemetry::{RunMode, decision};
use seedwarden_torrent_core::{TorrentClient, TorrentRecord};

use crate::error::{AppResult, tolerate};
use crate::rules::{classify_category, classify_tag, display_tracker, tracker_urls};

/// Outcome of a category or tag update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Torrents that received a new label.
    pub updated: usize,
    /// Unlabelled torrents no rule matched.
    pub unmatched: usize,
    /// Client calls that failed.
    pub failed: usize,
}

/// Assign a category to every uncategorized torrent whose save path matches a rule.
///
/// # Errors
///
/// Returns an error only when the client connection fails.
pub async fn update_categories(
    client: &dyn TorrentClient,
    torrents: &[TorrentRecord],
    rules: &RuleList,
    mode: RunMode,
) -> AppResult<UpdateReport> {
    let mut report = UpdateReport::default();
    for torrent in torrents.iter().filter(|t| t.is_uncategorized()) {
        let Some(category) = classify_category(&torrent.save_path, rules) else {
            report.unmatched += 1;
            continue;
        };
        decision!(
            mode,
            torrent = %torrent.name,
            category,
            tracker = %display_tracker(torrent),
            "New category"
        );
        report.updated += 1;
        if !mode.is_dry_run() {
            let result = client.set_category(&torrent.hash, category).await;
            tolerate("set_category", &torrent.hash, result, &mut report.failed)?;
        }
    }

    if report.updated == 0 {
        decision!(mode, "No new torrents to categorize.");
    } else {
        decision!(mode, count = report.updated, "Updated {} new categories.", report.updated);
    }
    Ok(report)
}

/// Tag every untagged torrent whose trackers match a rule.
///
/// # Errors
///
/// Returns an error only when the client connection fails.
pub async fn update_tags(
    client: &dyn TorrentClient,
    torrents: &[TorrentRecord],
    rules: &RuleList,
    mode: RunMode,
) -> AppResult<UpdateReport> {
    let mut report = UpdateReport::default();
    for torrent in torrents.iter().filter(|t| t.is_untagged()) {
        let Some(found) = classify_tag(tracker_urls(torrent), rules) else {
            report.unmatched += 1;
            continue;
        };
        decision!(
            mode,
            torrent = %torrent.name,
            tag = found.tag,
            tracker = %found.tracker,
            "New tag"
        );
        report.updated += 1;
        if !mode.is_dry_run() {
            let result = client.add_tags(&torrent.hash, &[found.tag.to_string()]).await;
            tolerate("add_tags", &torrent.hash, result, &mut report.failed)?;
        }
    }

    if report.updated == 0 {
        decision!(mode, "No new torrents to tag.");
    } else {
        decision!(mode, count = report.updated, "Updated {} new tags.", report.updated);
    }
    Ok(report)
}
