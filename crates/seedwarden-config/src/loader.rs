//! YAML configuration loading.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;
use crate::validate::validate_config;

/// File name used when no configuration path is supplied.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

const INLINE_ORIGIN: &str = "<inline>";

/// Read, parse and validate the configuration file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML for the
/// expected schema, or fails validation.
pub fn load_config(path: &Path) -> ConfigResult<AppConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&raw, &path.display().to_string())?;
    debug!(
        path = %path.display(),
        categories = config.categories.len(),
        tags = config.tags.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Parse and validate a configuration document held in memory.
///
/// # Errors
///
/// Returns an error if the document is not valid YAML for the expected schema
/// or fails validation.
pub fn load_config_from_str(raw: &str) -> ConfigResult<AppConfig> {
    parse(raw, INLINE_ORIGIN)
}

fn parse(raw: &str, origin: &str) -> ConfigResult<AppConfig> {
    let config: AppConfig = serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    validate_config(&config)?;
    Ok(config)
}
