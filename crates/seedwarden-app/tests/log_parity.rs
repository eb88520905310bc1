use std::io;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use seedwarden_app::{
    AggregatedView, recheck_paused, retire_unregistered, update_categories, update_tags,
};
use seedwarden_config::RuleList;
use seedwarden_telemetry::{DRY_RUN_LABEL, RunMode, SeverityLabelFormat};
use seedwarden_test_support::{FakeClient, TorrentBuilder};
use seedwarden_torrent_core::{TorrentRecord, TorrentState};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().map(|buf| buf.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLog {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn library() -> Vec<TorrentRecord> {
    vec![
        TorrentBuilder::new("new", "ShowX")
            .save_path("/data/TV")
            .tracker("https://tl.example/announce/key", "")
            .build(),
        TorrentBuilder::new("mv-good", "Movie.2020")
            .save_path("/data/Movies")
            .category("Movies")
            .tag("TL")
            .tracker("https://tl.example/announce/key", "")
            .build(),
        TorrentBuilder::new("mv-gone", "Movie.2020")
            .save_path("/data/Movies")
            .category("Movies")
            .tag("Other")
            .tracker("https://other.example/announce", "Unregistered torrent")
            .build(),
        TorrentBuilder::new("lonely", "Orphan.Release")
            .save_path("/data/Movies")
            .category("Movies")
            .tag("Other")
            .tracker("https://other.example/announce", "Torrent is not found")
            .build(),
        TorrentBuilder::new("paused-done", "Finished")
            .save_path("/data/Movies")
            .category("Movies")
            .state(TorrentState::PausedUp)
            .progress(1.0)
            .size(20)
            .tracker("https://tl.example/announce/key", "")
            .build(),
        TorrentBuilder::new("paused-fresh", "Movie.2020")
            .save_path("/data/Movies")
            .category("Movies")
            .tag("TL")
            .state(TorrentState::PausedDl)
            .progress(0.0)
            .size(10)
            .tracker("https://tl.example/announce/key", "")
            .build(),
    ]
}

async fn capture(mode: RunMode) -> Result<Vec<String>> {
    let torrents = library();
    let client = FakeClient::with_torrents(torrents.clone());
    let categories: RuleList = [("TV", "/data/TV"), ("Movies", "/data/Movies")]
        .into_iter()
        .collect();
    let tags: RuleList = [("tl.example", "TL"), ("other.example", "Other")]
        .into_iter()
        .collect();

    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(log.clone())
        .event_format(SeverityLabelFormat)
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let view = AggregatedView::build(&torrents, &categories);
    update_categories(&client, &torrents, &categories, mode).await?;
    update_tags(&client, &torrents, &tags, mode).await?;
    retire_unregistered(&client, &torrents, &view, mode).await?;
    recheck_paused(&client, &torrents, &view, &tags, mode).await?;

    Ok(log.lines())
}

fn without_timestamp(line: &str) -> &str {
    line.split_once(" - ").map_or(line, |(_, rest)| rest)
}

#[tokio::test]
async fn dry_run_log_matches_live_log_except_for_label() -> Result<()> {
    let dry = capture(RunMode::DryRun).await?;
    let live = capture(RunMode::Live).await?;

    assert!(!live.is_empty());
    assert!(
        dry.iter()
            .all(|line| !without_timestamp(line).starts_with("INFO:"))
    );
    assert!(
        live.iter()
            .all(|line| !without_timestamp(line).starts_with(DRY_RUN_LABEL))
    );

    let relabelled: Vec<String> = dry
        .iter()
        .map(|line| {
            let body = without_timestamp(line);
            body.strip_prefix(DRY_RUN_LABEL)
                .map_or_else(|| body.to_string(), |rest| format!("INFO{rest}"))
        })
        .collect();
    let live: Vec<&str> = live.iter().map(|line| without_timestamp(line)).collect();
    assert_eq!(relabelled, live);
    Ok(())
}
