use std::fs;

use anyhow::Result;
use seedwarden_config::{ConfigError, Requirement, ensure_requirements, load_config};
use tempfile::TempDir;

#[test]
fn loads_config_file_from_disk() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("config.yml");
    fs::write(
        &path,
        r"
qbt:
  host: 10.0.0.2:8080
  timeout_secs: 5
directory:
  root_dir: /data/torrents
  remote_dir: /mnt/user/data/torrents
cat:
  Movies: /data/torrents/Movies
tags:
  tracker.example: Example
",
    )?;

    let config = load_config(&path)?;
    assert_eq!(config.client.base_url(), "http://10.0.0.2:8080");
    assert_eq!(config.client.timeout_secs, 5);
    ensure_requirements(&config, &[Requirement::RootDir])?;
    assert!(matches!(
        ensure_requirements(&config, &[Requirement::CrossSeedDir]),
        Err(ConfigError::MissingField { .. })
    ));
    Ok(())
}

#[test]
fn malformed_yaml_is_a_parse_error() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("broken.yml");
    fs::write(&path, "qbt: [unterminated")?;

    let err = load_config(&path).expect_err("yaml is malformed");
    assert!(matches!(err, ConfigError::Parse { .. }));
    Ok(())
}
