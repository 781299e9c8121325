//! Metrics collection and exposition.
//!
//! # Metrics
//! - `headerblock_decisions_total` (counter): verdicts by `verdict` and `reason`
//! - `headerblock_invalid_allowlist_entries_total` (counter): skipped `allowedIPs` entries
//! - `headerblock_reloads_total` (counter): filter reloads by `result`
//!
//! # Design Decisions
//! - Counters are no-ops until a recorder is installed
//! - Prometheus exporter is optional and off by default

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::filter::Verdict;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(verdict: &Verdict) {
    let (outcome, reason) = match verdict {
        Verdict::Allow => ("allow", "none"),
        Verdict::Deny(reason) => ("deny", reason.as_label()),
    };
    metrics::counter!("headerblock_decisions_total", "verdict" => outcome, "reason" => reason).increment(1);
}

pub fn record_invalid_allowlist_entry() {
    metrics::counter!("headerblock_invalid_allowlist_entries_total").increment(1);
}

pub fn record_reload(success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("headerblock_reloads_total", "result" => result).increment(1);
}
