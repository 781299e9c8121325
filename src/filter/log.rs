//! Diagnostic side-channel for filter decisions.
//!
//! The filter never owns a logger. It is handed an optional sink at
//! construction and calls it synchronously; `None` means logging is off.

use std::net::IpAddr;

use crate::filter::engine::DenyReason;

/// Receives human-readable diagnostics from the filter.
pub trait DecisionLog: Send + Sync {
    /// An `allowedIPs` entry could not be parsed and was skipped.
    fn invalid_allowlist_entry(&self, entry: &str);

    /// A request was rejected.
    fn denied(&self, target: &str, client: Option<IpAddr>, reason: &DenyReason);

    /// A blocked header was let through by a whitelist rule.
    fn whitelisted(&self, target: &str, header: &str);

    /// A request was let through because its client is on the allowlist.
    fn allowlisted(&self, target: &str, client: IpAddr);
}

/// Default sink: emits `tracing` events under the `headerblock` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl DecisionLog for TracingLog {
    fn invalid_allowlist_entry(&self, entry: &str) {
        tracing::warn!(target: "headerblock", entry = %entry, "invalid allowedIP entry skipped");
    }

    fn denied(&self, target: &str, client: Option<IpAddr>, reason: &DenyReason) {
        match reason {
            DenyReason::IpNotAllowed => {
                let client = client.map(|ip| ip.to_string()).unwrap_or_else(|| "<invalid>".into());
                tracing::warn!(target: "headerblock", url = %target, client = %client, "access denied - IP not allowed");
            }
            DenyReason::BlockedHeader { name } => {
                tracing::warn!(target: "headerblock", url = %target, header = %name, "access denied - blocked header");
            }
        }
    }

    fn whitelisted(&self, target: &str, header: &str) {
        tracing::info!(target: "headerblock", url = %target, header = %header, "access allowed - whitelisted header");
    }

    fn allowlisted(&self, target: &str, client: IpAddr) {
        tracing::debug!(target: "headerblock", url = %target, client = %client, "access allowed - IP allowlisted");
    }
}
