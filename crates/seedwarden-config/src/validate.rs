//! Validation helpers for configuration documents.

use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{AppConfig, RuleList};

/// Configuration a requested operation cannot run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// `directory.root_dir`, needed by the orphaned-file scan.
    RootDir,
    /// `directory.cross_seed`, needed by the cross-seed import.
    CrossSeedDir,
}

/// Validate field contents of a parsed document.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the client host is blank or a
/// rule has an empty key, or a category rule has an empty path substring.
pub fn validate_config(config: &AppConfig) -> ConfigResult<()> {
    if config.client.host.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            section: "qbt",
            field: "host".to_string(),
            value: None,
            reason: "must not be empty",
        });
    }

    ensure_keys(&config.categories, "cat")?;
    ensure_keys(&config.tags, "tags")?;

    if let Some(rule) = config.categories.iter().find(|rule| rule.value.is_empty()) {
        return Err(ConfigError::InvalidField {
            section: "cat",
            field: rule.key.clone(),
            value: None,
            reason: "path substring must not be empty",
        });
    }

    if config.categories.is_empty() {
        warn!("no category rules configured; every torrent will stay uncategorized");
    }
    if config.tags.is_empty() {
        warn!("no tag rules configured; every torrent will stay untagged");
    }

    Ok(())
}

fn ensure_keys(rules: &RuleList, section: &'static str) -> ConfigResult<()> {
    match rules.iter().find(|rule| rule.key.trim().is_empty()) {
        Some(rule) => Err(ConfigError::InvalidField {
            section,
            field: rule.key.clone(),
            value: Some(rule.value.clone()),
            reason: "rule key must not be empty",
        }),
        None => Ok(()),
    }
}

/// Check that every field needed by the requested operations is present.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] for the first unmet requirement.
pub fn ensure_requirements(config: &AppConfig, requirements: &[Requirement]) -> ConfigResult<()> {
    for requirement in requirements {
        let present = match requirement {
            Requirement::RootDir => config.directory.root_dir.is_some(),
            Requirement::CrossSeedDir => config.directory.cross_seed.is_some(),
        };
        if !present {
            return Err(ConfigError::MissingField {
                section: "directory",
                field: match requirement {
                    Requirement::RootDir => "root_dir",
                    Requirement::CrossSeedDir => "cross_seed",
                },
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientConfig, DirectoryConfig, Rule};

    fn config() -> AppConfig {
        AppConfig {
            client: ClientConfig {
                host: "localhost:8080".to_string(),
                username: None,
                password: None,
                timeout_secs: 5,
            },
            directory: DirectoryConfig::default(),
            categories: RuleList::new(vec![Rule::new("TV", "/data/TV")]),
            tags: RuleList::default(),
        }
    }

    #[test]
    fn blank_host_is_rejected() {
        let mut config = config();
        config.client.host = "  ".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidField { section: "qbt", .. })
        ));
    }

    #[test]
    fn empty_category_substring_is_rejected() {
        let mut config = config();
        config.categories = RuleList::new(vec![Rule::new("TV", "")]);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidField { section: "cat", .. })
        ));
    }

    #[test]
    fn empty_tag_value_is_accepted() {
        let mut config = config();
        config.tags = RuleList::new(vec![Rule::new("tracker.example", "")]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn requirements_report_missing_directories() {
        let mut config = config();
        assert!(matches!(
            ensure_requirements(&config, &[Requirement::RootDir]),
            Err(ConfigError::MissingField {
                field: "root_dir",
                ..
            })
        ));
        config.directory.cross_seed = Some("/drop".into());
        assert!(ensure_requirements(&config, &[Requirement::CrossSeedDir]).is_ok());
    }
}
