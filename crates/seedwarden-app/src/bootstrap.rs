//! Run wiring: configuration, client connection, reconciliation.

use std::path::PathBuf;
use std::time::Duration;

use seedwarden_config::{AppConfig, ensure_requirements, load_config};
use seedwarden_qbittorrent::{ConnectOptions, QbitClient};
use seedwarden_telemetry::RunMode;
use seedwarden_torrent_core::TorrentClient;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::orchestrator::{Operations, Reconciler, RunSummary};

/// Inputs of one invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Configuration file path.
    pub config_path: PathBuf,
    /// Requested passes.
    pub operations: Operations,
    /// Live or dry run.
    pub mode: RunMode,
}

/// Load configuration, connect to the client and run the requested passes.
///
/// Returns an empty summary without touching the configuration or the
/// client when no pass is selected.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or lacks a field a pass
/// needs, or if the client connection fails at any point.
pub async fn run_app(options: &RunOptions) -> AppResult<RunSummary> {
    if !options.operations.any() {
        info!("No operation selected. Pass --manage or one of the individual operation flags.");
        return Ok(RunSummary::default());
    }

    let config = load_config(&options.config_path)
        .map_err(|err| AppError::config("load_config", err))?;
    ensure_requirements(&config, &options.operations.resolved().requirements())
        .map_err(|err| AppError::config("ensure_requirements", err))?;

    let base_url = config.client.base_url();
    let client = QbitClient::connect(&ConnectOptions {
        base_url: &base_url,
        username: config.client.username.as_deref(),
        password: config.client.password.as_deref(),
        timeout: Duration::from_secs(config.client.timeout_secs),
    })
    .await
    .map_err(|err| AppError::torrent("connect", err))?;

    run_with(&client, &config, options.operations, options.mode).await
}

/// Run the requested passes against an already connected client.
///
/// # Errors
///
/// Propagates the fatal errors of [`Reconciler::run`].
pub async fn run_with(
    client: &dyn TorrentClient,
    config: &AppConfig,
    operations: Operations,
    mode: RunMode,
) -> AppResult<RunSummary> {
    info!(
        dry_run = mode.is_dry_run(),
        operations = ?operations.resolved(),
        "reconciliation run starting"
    );
    Reconciler::new(client, config, mode).run(operations).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn empty_selection_skips_everything() -> AppResult<()> {
        let options = RunOptions {
            config_path: PathBuf::from("/definitely/missing/config.yml"),
            operations: Operations::default(),
            mode: RunMode::Live,
        };
        assert_eq!(run_app(&options).await?, RunSummary::default());
        Ok(())
    }

    #[tokio::test]
    async fn missing_prerequisite_fails_before_connecting() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.yml");
        fs::write(&path, "qbt:\n  host: 127.0.0.1:1\n")?;
        let options = RunOptions {
            config_path: path,
            operations: Operations {
                orphan_scan: true,
                ..Operations::default()
            },
            mode: RunMode::Live,
        };

        let err = run_app(&options).await;
        assert!(matches!(
            err,
            Err(AppError::Config {
                operation: "ensure_requirements",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_client_is_fatal() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.yml");
        fs::write(&path, "qbt:\n  host: 127.0.0.1:1\n  timeout_secs: 1\n")?;
        let options = RunOptions {
            config_path: path,
            operations: Operations::manage(),
            mode: RunMode::Live,
        };

        let err = run_app(&options).await;
        assert!(matches!(
            err,
            Err(AppError::Torrent {
                operation: "connect",
                ..
            })
        ));
        Ok(())
    }
}
