//! In-memory torrent client that records every mutation.

use std::collections::HashSet;

use async_trait::async_trait;
use seedwarden_torrent_core::{
    AddTorrentFile, RemoveTorrent, TorrentClient, TorrentError, TorrentRecord, TorrentResult,
    TorrentState,
};
use tokio::sync::RwLock;

/// Mutation observed by [`FakeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Category assignment.
    SetCategory {
        /// Target torrent.
        hash: String,
        /// Assigned category.
        category: String,
    },
    /// Tag addition.
    AddTags {
        /// Target torrent.
        hash: String,
        /// Added tags.
        tags: Vec<String>,
    },
    /// Torrent removal.
    Remove {
        /// Target torrent.
        hash: String,
        /// Whether data was deleted too.
        with_data: bool,
    },
    /// Resume request.
    Resume {
        /// Target torrent.
        hash: String,
    },
    /// Recheck request.
    Recheck {
        /// Target torrent.
        hash: String,
    },
    /// Torrent admission from a metainfo file.
    Add {
        /// Submitted file name.
        file_name: String,
        /// Requested save path.
        save_path: String,
        /// Requested category.
        category: Option<String>,
        /// Whether admission was paused.
        paused: bool,
    },
}

/// Torrent client double backed by an in-memory list.
///
/// Listing returns torrents in insertion order, which tests treat as
/// newest first. Hashes registered through [`FakeClient::fail_on`] make
/// every mutation against them fail.
#[derive(Debug, Default)]
pub struct FakeClient {
    torrents: RwLock<Vec<TorrentRecord>>,
    mutations: RwLock<Vec<Mutation>>,
    failing: RwLock<HashSet<String>>,
    listing_fails: RwLock<bool>,
}

impl FakeClient {
    /// Seed the client with `torrents`.
    #[must_use]
    pub fn with_torrents(torrents: Vec<TorrentRecord>) -> Self {
        Self {
            torrents: RwLock::new(torrents),
            ..Self::default()
        }
    }

    /// Make mutations against `hash` fail.
    pub async fn fail_on(&self, hash: impl Into<String>) {
        self.failing.write().await.insert(hash.into());
    }

    /// Make listing fail with a connection error.
    pub async fn fail_listing(&self) {
        *self.listing_fails.write().await = true;
    }

    /// Mutations recorded so far, in call order.
    pub async fn mutations(&self) -> Vec<Mutation> {
        self.mutations.read().await.clone()
    }

    /// Current torrent snapshot.
    pub async fn torrents(&self) -> Vec<TorrentRecord> {
        self.torrents.read().await.clone()
    }

    /// Snapshot of one torrent.
    pub async fn torrent(&self, hash: &str) -> Option<TorrentRecord> {
        self.torrents
            .read()
            .await
            .iter()
            .find(|torrent| torrent.hash == hash)
            .cloned()
    }

    async fn guard(&self, operation: &'static str, hash: &str) -> TorrentResult<()> {
        if self.failing.read().await.contains(hash) {
            return Err(TorrentError::OperationFailed {
                operation,
                hash: Some(hash.to_string()),
                source: format!("injected failure for {hash}").into(),
            });
        }
        Ok(())
    }

    async fn record(&self, mutation: Mutation) {
        self.mutations.write().await.push(mutation);
    }

    async fn update<F>(&self, hash: &str, apply: F)
    where
        F: FnOnce(&mut TorrentRecord) + Send,
    {
        if let Some(torrent) = self
            .torrents
            .write()
            .await
            .iter_mut()
            .find(|torrent| torrent.hash == hash)
        {
            apply(torrent);
        }
    }
}

#[async_trait]
impl TorrentClient for FakeClient {
    async fn list_torrents(&self) -> TorrentResult<Vec<TorrentRecord>> {
        if *self.listing_fails.read().await {
            return Err(TorrentError::Connection {
                operation: "list_torrents",
                detail: "injected listing failure".to_string(),
                source: None,
            });
        }
        Ok(self.torrents().await)
    }

    async fn set_category(&self, hash: &str, category: &str) -> TorrentResult<()> {
        self.guard("set_category", hash).await?;
        self.record(Mutation::SetCategory {
            hash: hash.to_string(),
            category: category.to_string(),
        })
        .await;
        let category = category.to_string();
        self.update(hash, move |torrent| torrent.category = Some(category))
            .await;
        Ok(())
    }

    async fn add_tags(&self, hash: &str, tags: &[String]) -> TorrentResult<()> {
        self.guard("add_tags", hash).await?;
        self.record(Mutation::AddTags {
            hash: hash.to_string(),
            tags: tags.to_vec(),
        })
        .await;
        let tags = tags.to_vec();
        self.update(hash, move |torrent| {
            for tag in tags {
                if !torrent.tags.contains(&tag) {
                    torrent.tags.push(tag);
                }
            }
        })
        .await;
        Ok(())
    }

    async fn remove_torrent(&self, hash: &str, options: RemoveTorrent) -> TorrentResult<()> {
        self.guard("remove_torrent", hash).await?;
        self.record(Mutation::Remove {
            hash: hash.to_string(),
            with_data: options.with_data,
        })
        .await;
        self.torrents
            .write()
            .await
            .retain(|torrent| torrent.hash != hash);
        Ok(())
    }

    async fn resume_torrent(&self, hash: &str) -> TorrentResult<()> {
        self.guard("resume_torrent", hash).await?;
        self.record(Mutation::Resume {
            hash: hash.to_string(),
        })
        .await;
        self.update(hash, |torrent| {
            torrent.state = if torrent.progress >= 1.0 {
                TorrentState::StalledUp
            } else {
                TorrentState::Downloading
            };
        })
        .await;
        Ok(())
    }

    async fn recheck(&self, hash: &str) -> TorrentResult<()> {
        self.guard("recheck", hash).await?;
        self.record(Mutation::Recheck {
            hash: hash.to_string(),
        })
        .await;
        Ok(())
    }

    async fn add_torrent(&self, request: AddTorrentFile) -> TorrentResult<()> {
        self.guard("add_torrent", &request.file_name).await?;
        self.record(Mutation::Add {
            file_name: request.file_name.clone(),
            save_path: request.save_path.clone(),
            category: request.category.clone(),
            paused: request.paused,
        })
        .await;
        let mut torrents = self.torrents.write().await;
        let hash = format!("added-{}", torrents.len());
        torrents.insert(
            0,
            TorrentRecord {
                hash,
                name: request
                    .file_name
                    .trim_end_matches(".torrent")
                    .to_string(),
                save_path: request.save_path,
                state: if request.paused {
                    TorrentState::PausedDl
                } else {
                    TorrentState::Downloading
                },
                progress: 0.0,
                size_bytes: 0,
                tags: Vec::new(),
                category: request.category,
                trackers: Vec::new(),
                files: Vec::new(),
            },
        );
        Ok(())
    }
}
