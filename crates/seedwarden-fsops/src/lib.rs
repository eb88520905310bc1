//! Orphaned-file detection and quarantine for the managed content root.
//!
//! Layout: `model/` (path mapping and scan report), `service.rs`
//! (`OrphanScanner`), `error.rs` (`FsOpsError`).
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

pub use error::{FsOpsError, FsOpsResult};
pub use model::{OrphanReport, PathMapping, QUARANTINE_DIR_NAME};
pub use service::{OrphanScanner, find_orphans, prune_empty_dirs, referenced_files};
