//! Resume and recheck driver for paused torrents.

use seedwarden_config::RuleList;
use seedwarden_telemetry::{RunMode, decision};
use seedwarden_torrent_core::{TorrentClient, TorrentRecord};

use crate::aggregate::AggregatedView;
use crate::error::{AppResult, tolerate};
use crate::rules::{classify_tag, tracker_urls};

/// What to do with one paused torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecheckAction {
    /// Fully downloaded: resume seeding.
    Resume,
    /// Nothing verified yet but a duplicate is complete: verify on-disk data.
    Recheck,
    /// Partially downloaded, or no complete duplicate exists.
    Leave,
}

impl RecheckAction {
    /// Decide the action for a paused torrent.
    #[must_use]
    pub fn decide(torrent: &TorrentRecord, view: &AggregatedView) -> Self {
        if torrent.progress >= 1.0 {
            Self::Resume
        } else if torrent.progress <= 0.0
            && view
                .get(&torrent.name)
                .is_some_and(|entry| entry.is_complete)
        {
            Self::Recheck
        } else {
            Self::Leave
        }
    }
}

/// Outcome of one resume/recheck pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecheckReport {
    /// Paused torrents resumed.
    pub resumed: usize,
    /// Paused torrents sent for recheck.
    pub rechecked: usize,
    /// Untagged paused torrents tagged on the way.
    pub tagged: usize,
    /// Paused torrents left alone.
    pub untouched: usize,
    /// Client calls that failed.
    pub failed: usize,
}

/// Resume or recheck every paused torrent, smallest payload first.
///
/// # Errors
///
/// Returns an error only when the client connection fails.
pub async fn recheck_paused(
    client: &dyn TorrentClient,
    torrents: &[TorrentRecord],
    view: &AggregatedView,
    tag_rules: &RuleList,
    mode: RunMode,
) -> AppResult<RecheckReport> {
    let mut paused: Vec<&TorrentRecord> = torrents.iter().filter(|t| t.is_paused()).collect();
    paused.sort_by_key(|torrent| torrent.size_bytes);

    let mut report = RecheckReport::default();
    for torrent in paused {
        let tag = classify_tag(tracker_urls(torrent), tag_rules);
        let label = tag.as_ref().map_or("", |found| found.tag);

        if let Some(found) = tag.as_ref().filter(|_| torrent.is_untagged()) {
            decision!(mode, torrent = %torrent.name, tag = found.tag, "Tagging paused torrent");
            report.tagged += 1;
            if !mode.is_dry_run() {
                let result = client.add_tags(&torrent.hash, &[found.tag.to_string()]).await;
                tolerate("add_tags", &torrent.hash, result, &mut report.failed)?;
            }
        }

        match RecheckAction::decide(torrent, view) {
            RecheckAction::Resume => {
                decision!(mode, tag = label, torrent = %torrent.name, "Resuming {label} - {}", torrent.name);
                report.resumed += 1;
                if !mode.is_dry_run() {
                    let result = client.resume_torrent(&torrent.hash).await;
                    tolerate("resume_torrent", &torrent.hash, result, &mut report.failed)?;
                }
            }
            RecheckAction::Recheck => {
                decision!(mode, tag = label, torrent = %torrent.name, "Rechecking {label} - {}", torrent.name);
                report.rechecked += 1;
                if !mode.is_dry_run() {
                    let result = client.recheck(&torrent.hash).await;
                    tolerate("recheck", &torrent.hash, result, &mut report.failed)?;
                }
            }
            RecheckAction::Leave => report.untouched += 1,
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedwarden_test_support::{FakeClient, Mutation, TorrentBuilder};
    use seedwarden_torrent_core::TorrentState;

    fn scenario() -> Vec<TorrentRecord> {
        vec![
            TorrentBuilder::new("done", "Finished")
                .state(TorrentState::PausedUp)
                .progress(1.0)
                .size(300)
                .tag("existing")
                .build(),
            TorrentBuilder::new("fresh", "Shared")
                .state(TorrentState::PausedDl)
                .progress(0.0)
                .size(200)
                .tracker("https://tl.example/announce", "")
                .build(),
            TorrentBuilder::new("seed", "Shared")
                .state(TorrentState::Uploading)
                .tag("existing")
                .build(),
            TorrentBuilder::new("half", "Partial")
                .state(TorrentState::PausedDl)
                .progress(0.5)
                .size(100)
                .tag("existing")
                .build(),
        ]
    }

    fn tags() -> RuleList {
        [("tl.example", "TL")].into_iter().collect()
    }

    #[test]
    fn actions_follow_progress_extremes() {
        let torrents = scenario();
        let view = AggregatedView::build(&torrents, &RuleList::default());
        assert_eq!(RecheckAction::decide(&torrents[0], &view), RecheckAction::Resume);
        assert_eq!(RecheckAction::decide(&torrents[1], &view), RecheckAction::Recheck);
        assert_eq!(RecheckAction::decide(&torrents[3], &view), RecheckAction::Leave);

        let lone = vec![
            TorrentBuilder::new("x", "Lonely")
                .state(TorrentState::PausedDl)
                .progress(0.0)
                .build(),
        ];
        let view = AggregatedView::build(&lone, &RuleList::default());
        assert_eq!(RecheckAction::decide(&lone[0], &view), RecheckAction::Leave);
    }

    #[tokio::test]
    async fn paused_torrents_are_processed_smallest_first() -> AppResult<()> {
        let torrents = scenario();
        let view = AggregatedView::build(&torrents, &RuleList::default());
        let client = FakeClient::with_torrents(torrents.clone());

        let report = recheck_paused(&client, &torrents, &view, &tags(), RunMode::Live).await?;

        assert_eq!(
            report,
            RecheckReport {
                resumed: 1,
                rechecked: 1,
                tagged: 1,
                untouched: 1,
                failed: 0,
            }
        );
        assert_eq!(
            client.mutations().await,
            vec![
                Mutation::AddTags {
                    hash: "fresh".to_string(),
                    tags: vec!["TL".to_string()],
                },
                Mutation::Recheck {
                    hash: "fresh".to_string(),
                },
                Mutation::Resume {
                    hash: "done".to_string(),
                },
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn dry_run_decides_identically() -> AppResult<()> {
        let torrents = scenario();
        let view = AggregatedView::build(&torrents, &RuleList::default());
        let dry_client = FakeClient::with_torrents(torrents.clone());
        let live_client = FakeClient::with_torrents(torrents.clone());

        let dry = recheck_paused(&dry_client, &torrents, &view, &tags(), RunMode::DryRun).await?;
        let live = recheck_paused(&live_client, &torrents, &view, &tags(), RunMode::Live).await?;

        assert_eq!(dry, live);
        assert!(dry_client.mutations().await.is_empty());
        Ok(())
    }
}
