//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Compile the filter and report what it holds
//! - Start background tasks (metrics, config watcher, signal handling)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener starts last (traffic only when ready)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::watcher::ConfigWatcher;
use crate::config::GatewayConfig;
use crate::filter::{DecisionLog, FilterResult, HeaderBlock, TracingLog};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// How the gateway was asked to start.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Configuration file; built-in defaults when absent.
    pub config_path: Option<PathBuf>,
    /// Reload the filter when the configuration file changes.
    pub watch: bool,
}

/// Summary of a compiled filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub block_rules: usize,
    pub whitelist_rules: usize,
    pub allowed_networks: usize,
}

/// Load the configuration file, or validated defaults when none is given.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = GatewayConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Compile the filter once, reporting skipped allowlist entries regardless
/// of the `log` setting.
pub fn check(config: &GatewayConfig) -> FilterResult<FilterReport> {
    let log: Arc<dyn DecisionLog> = Arc::new(TracingLog);
    let filter = HeaderBlock::with_log(&config.filter, Some(log))?;

    Ok(FilterReport {
        block_rules: filter.block_rules().len(),
        whitelist_rules: filter.whitelist_rules().len(),
        allowed_networks: filter.allowlist().len(),
    })
}

/// Run the gateway until a shutdown signal arrives.
pub async fn start(
    config: GatewayConfig,
    options: StartupOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config)?;
    let report = server.filter().current();
    tracing::info!(
        block_rules = report.block_rules().len(),
        whitelist_rules = report.whitelist_rules().len(),
        allowed_networks = report.allowlist().len(),
        "Filter compiled"
    );
    drop(report);

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match (&options.config_path, options.watch) {
        (Some(path), true) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(watcher.run()?), rx)
        }
        _ => {
            let (_, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_requested().await;
        shutdown.trigger();
    });

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, config_updates, server_shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderConfig;

    #[test]
    fn test_load_defaults_without_path() {
        let config = load(None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_check_reports_counts() {
        let mut config = GatewayConfig::default();
        config.filter.request_headers.push(HeaderConfig {
            name: "X-Test".into(),
            value: String::new(),
        });
        config.filter.allowed_ips = vec!["10.0.0.0/8, bogus, ::1".into()];

        assert_eq!(
            check(&config).unwrap(),
            FilterReport {
                block_rules: 1,
                whitelist_rules: 0,
                allowed_networks: 2,
            }
        );
    }
}
