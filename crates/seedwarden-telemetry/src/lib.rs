//! Logging primitives shared across the Seedwarden workspace.
//!
//! Layout: `init.rs` (subscriber installation), `format.rs` (line format with
//! the `DRY-RUN` severity label), `mode.rs` (`RunMode` and the `decision!`
//! macro).
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

pub mod format;
pub mod init;
pub mod mode;

pub use format::{DRY_RUN_LABEL, DRY_RUN_TARGET, SeverityLabelFormat, severity_label};
pub use init::{
    DEFAULT_LOG_LEVEL, LOG_FILE_BACKUPS, LogFormat, LoggingConfig, LoggingGuard, init_logging,
};
pub use mode::RunMode;

#[doc(hidden)]
pub use tracing as __tracing;
