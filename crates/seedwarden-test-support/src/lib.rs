//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (torrent record builders), mocks.rs (in-memory torrent client).
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

pub mod fixtures;
pub mod mocks;

pub use fixtures::TorrentBuilder;
pub use mocks::{FakeClient, Mutation};
