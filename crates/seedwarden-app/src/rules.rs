//! Config-driven classification: save path to category, tracker URLs to tag.
//!
//! Both lookups are plain substring tests evaluated first-match in rule
//! declaration order.

use seedwarden_config::RuleList;
use seedwarden_torrent_core::{TorrentRecord, truncate_url};
use tracing::warn;

/// Tag resolved from a torrent's trackers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch<'r> {
    /// Tag to apply.
    pub tag: &'r str,
    /// Matching tracker URL truncated for display.
    pub tracker: String,
}

/// Category of the first rule whose path substring occurs in `save_path`.
///
/// Category rules map category name (key) to path substring (value).
pub fn classify_category<'r>(save_path: &str, rules: &'r RuleList) -> Option<&'r str> {
    let category = rules
        .iter()
        .find(|rule| save_path.contains(rule.value.as_str()))
        .map(|rule| rule.key.as_str());
    if category.is_none() {
        warn!(save_path, "No categories matched. Check your config file.");
    }
    category
}

/// Tag for the first hypertext tracker URL containing a rule's substring.
///
/// Tag rules map tracker substring (key) to tag (value). URLs are tried in
/// order, rules in declaration order for each URL; a rule with an empty tag
/// is skipped.
pub fn classify_tag<'r, 'u, I>(tracker_urls: I, rules: &'r RuleList) -> Option<TagMatch<'r>>
where
    I: IntoIterator<Item = &'u str>,
{
    for url in tracker_urls
        .into_iter()
        .filter(|url| url.starts_with("http"))
    {
        let found = rules
            .iter()
            .find(|rule| !rule.value.is_empty() && url.contains(rule.key.as_str()));
        if let Some(rule) = found {
            return Some(TagMatch {
                tag: rule.value.as_str(),
                tracker: truncate_url(url),
            });
        }
    }
    warn!("No tags matched. Check your config file.");
    None
}

/// Hypertext tracker URLs of a torrent, in client order.
pub(crate) fn tracker_urls(torrent: &TorrentRecord) -> impl Iterator<Item = &str> {
    torrent
        .hypertext_trackers()
        .map(|tracker| tracker.url.as_str())
}

/// First hypertext tracker truncated for display, empty when there is none.
pub(crate) fn display_tracker(torrent: &TorrentRecord) -> String {
    tracker_urls(torrent)
        .next()
        .map(truncate_url)
        .unwrap_or_default()
}
