//! Client-agnostic torrent interfaces and DTOs.
//!
//! Layout: `model/` (records reported by a torrent client and mutation
//! payloads), `service/` (the `TorrentClient` collaborator trait),
//! `error.rs` (`TorrentError`).
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

pub mod error;
pub mod model;
pub mod service;

pub use error::{TorrentError, TorrentResult};
pub use model::{
    AddTorrentFile, RemoveTorrent, TorrentFile, TorrentRecord, TorrentState, TrackerEntry,
    truncate_url,
};
pub use service::TorrentClient;
