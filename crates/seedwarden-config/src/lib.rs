//! File-backed configuration for the reconciliation engine.
//!
//! Layout: `model.rs` (typed configuration and ordered rule lists),
//! `loader.rs` (YAML loading), `validate.rs` (field checks and operation
//! prerequisites), `error.rs` (`ConfigError`).
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
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{DEFAULT_CONFIG_FILE, load_config, load_config_from_str};
pub use model::{AppConfig, ClientConfig, DirectoryConfig, Rule, RuleList};
pub use validate::{Requirement, ensure_requirements, validate_config};
