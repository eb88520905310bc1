//! Torrent state reconciliation engine.
//!
//! Layout: `rules.rs` (category/tag classification), `aggregate.rs`
//! (per-name duplicate view), `classify.rs` (category and tag update passes),
//! `retire.rs` (unregistered-torrent removal), `cross_seed.rs` (drop-directory
//! import), `recheck.rs` (resume/recheck of paused torrents),
//! `orchestrator.rs` (operation selection and ordering), `bootstrap.rs`
//! (config, connection and run wiring).
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

pub mod aggregate;
pub mod bootstrap;
pub mod classify;
pub mod cross_seed;
pub mod error;
pub mod orchestrator;
pub mod recheck;
pub mod retire;
pub mod rules;

pub use aggregate::{AggregateEntry, AggregatedView};
pub use bootstrap::{RunOptions, run_app, run_with};
pub use classify::{UpdateReport, update_categories, update_tags};
pub use cross_seed::{CrossSeedReport, PROCESSED_DIR_NAME, import_cross_seeds, name_fragment};
pub use error::{AppError, AppResult};
pub use orchestrator::{Operations, Reconciler, RunSummary};
pub use recheck::{RecheckAction, RecheckReport, recheck_paused};
pub use retire::{RetireReport, Retirement, UNREGISTERED_MARKERS, retire_unregistered};
pub use rules::{TagMatch, classify_category, classify_tag};
