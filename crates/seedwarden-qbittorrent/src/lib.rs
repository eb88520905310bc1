//! qBittorrent Web API adapter implementing [`seedwarden_torrent_core::TorrentClient`].
//!
//! Layout: `client.rs` (session handling and trait implementation),
//! `wire.rs` (response payloads and their conversion into domain records).
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

pub mod client;
mod wire;

pub use client::{ConnectOptions, QbitClient};
