//! Per-name view of the torrent set, merging cross-seed duplicates.
//!
//! # Design
//! - Built in one pass over the client listing, in client order.
//! - Entries keep first-insertion order so substring lookups are deterministic.
//! - Completion is an OR across duplicates and therefore order-independent.

use std::collections::HashMap;

use seedwarden_config::RuleList;
use seedwarden_torrent_core::TorrentRecord;
use tracing::warn;

use crate::rules::classify_category;

/// Merged summary of every torrent sharing one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateEntry {
    /// Category resolved from the save path of the last merged duplicate.
    pub category: Option<String>,
    /// Save path of the last merged duplicate.
    pub save_path: String,
    /// Number of torrents with this name; at least one.
    pub duplicate_count: usize,
    /// Representative tracker message of each duplicate that has a hypertext tracker.
    pub messages: Vec<String>,
    /// Whether any duplicate is complete.
    pub is_complete: bool,
}

impl AggregateEntry {
    /// Whether some duplicate reports an empty (healthy) tracker message.
    #[must_use]
    pub fn has_healthy_duplicate(&self) -> bool {
        self.messages.iter().any(String::is_empty)
    }
}

/// Name-keyed aggregate of the current torrent set.
#[derive(Debug, Clone, Default)]
pub struct AggregatedView {
    entries: Vec<(String, AggregateEntry)>,
    index: HashMap<String, usize>,
}

impl AggregatedView {
    /// Aggregate `torrents`, resolving categories with `categories`.
    #[must_use]
    pub fn build(torrents: &[TorrentRecord], categories: &RuleList) -> Self {
        let mut view = Self::default();
        for torrent in torrents {
            let category = classify_category(&torrent.save_path, categories).map(str::to_string);
            view.merge(torrent, category);
        }
        view
    }

    fn merge(&mut self, torrent: &TorrentRecord, category: Option<String>) {
        let message = torrent.representative_message().map(str::to_string);
        if message.is_none() {
            warn!(
                torrent = %torrent.name,
                hash = %torrent.hash,
                "torrent has no http tracker; no status message recorded"
            );
        }

        if let Some(&position) = self.index.get(&torrent.name) {
            let entry = &mut self.entries[position].1;
            entry.category = category;
            entry.save_path.clone_from(&torrent.save_path);
            entry.duplicate_count += 1;
            entry.messages.extend(message);
            entry.is_complete |= torrent.is_complete();
            return;
        }

        self.index.insert(torrent.name.clone(), self.entries.len());
        self.entries.push((
            torrent.name.clone(),
            AggregateEntry {
                category,
                save_path: torrent.save_path.clone(),
                duplicate_count: 1,
                messages: message.into_iter().collect(),
                is_complete: torrent.is_complete(),
            },
        ));
    }

    /// Entry for an exact torrent name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AggregateEntry> {
        self.index
            .get(name)
            .and_then(|&position| self.entries.get(position))
            .map(|(_, entry)| entry)
    }

    /// First entry, in insertion order, whose name contains `fragment`.
    #[must_use]
    pub fn find_containing(&self, fragment: &str) -> Option<(&str, &AggregateEntry)> {
        self.entries
            .iter()
            .find(|(name, _)| name.contains(fragment))
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of distinct names.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no torrents were aggregated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
