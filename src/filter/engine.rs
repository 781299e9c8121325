//! Per-request decision orchestration.
//!
//! # Responsibilities
//! - Own the compiled block rules, whitelist rules and allowlist
//! - Run the IP check, then the header check, for one request
//! - Produce a single allow/deny verdict
//!
//! # Design Decisions
//! - Immutable after construction; `evaluate` takes `&self` and is safe to
//!   call from any number of tasks at once
//! - A configured allowlist is a trust boundary: clients inside it skip the
//!   header rules, clients outside it are denied
//! - The request is never mutated

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::FilterConfig;
use crate::filter::allowlist::Allowlist;
use crate::filter::error::{FilterResult, RuleList};
use crate::filter::headers;
use crate::filter::log::{DecisionLog, TracingLog};
use crate::filter::rules::RuleSet;

/// Read-only view of one request.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// Client address from the connection; `None` if it could not be read.
    pub client: Option<IpAddr>,
    pub headers: &'a HeaderMap,
    /// Request target, for diagnostics only.
    pub target: &'a str,
}

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    IpNotAllowed,
    BlockedHeader { name: String },
}

impl DenyReason {
    /// Short label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DenyReason::IpNotAllowed => "ip",
            DenyReason::BlockedHeader { .. } => "header",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::IpNotAllowed => write!(f, "IP not allowed"),
            DenyReason::BlockedHeader { name } => write!(f, "blocked header {}", name),
        }
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// The compiled request filter.
pub struct HeaderBlock {
    block: RuleSet,
    whitelist: RuleSet,
    allowlist: Allowlist,
    log: Option<Arc<dyn DecisionLog>>,
}

impl HeaderBlock {
    /// Compile a filter, logging through `tracing` when `config.log` is set.
    pub fn new(config: &FilterConfig) -> FilterResult<Self> {
        let log: Option<Arc<dyn DecisionLog>> = if config.log {
            Some(Arc::new(TracingLog))
        } else {
            None
        };
        Self::with_log(config, log)
    }

    /// Compile a filter with an explicit diagnostic sink (`None` = silent).
    pub fn with_log(config: &FilterConfig, log: Option<Arc<dyn DecisionLog>>) -> FilterResult<Self> {
        let block = RuleSet::compile(RuleList::Block, &config.request_headers)?;
        let whitelist = RuleSet::compile(RuleList::Whitelist, &config.whitelist_request_headers)?;
        let allowlist = Allowlist::parse(&config.allowed_ips, log.as_deref());

        Ok(Self {
            block,
            whitelist,
            allowlist,
            log,
        })
    }

    /// Decide whether the request may continue down the chain.
    pub fn evaluate(&self, ctx: &DecisionContext<'_>) -> Verdict {
        if !self.allowlist.is_empty() {
            if !self.allowlist.contains(ctx.client) {
                return self.deny(ctx, DenyReason::IpNotAllowed);
            }
            if let (Some(log), Some(client)) = (&self.log, ctx.client) {
                log.allowlisted(ctx.target, client);
            }
            return Verdict::Allow;
        }

        let scan = headers::scan(ctx.headers, &self.block, &self.whitelist);

        if let Some(log) = &self.log {
            for name in &scan.whitelisted {
                log.whitelisted(ctx.target, name);
            }
        }

        match scan.blocked {
            Some(name) => self.deny(ctx, DenyReason::BlockedHeader { name }),
            None => Verdict::Allow,
        }
    }

    fn deny(&self, ctx: &DecisionContext<'_>, reason: DenyReason) -> Verdict {
        if let Some(log) = &self.log {
            log.denied(ctx.target, ctx.client, &reason);
        }
        Verdict::Deny(reason)
    }

    pub fn block_rules(&self) -> &RuleSet {
        &self.block
    }

    pub fn whitelist_rules(&self) -> &RuleSet {
        &self.whitelist
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }
}

impl fmt::Debug for HeaderBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderBlock")
            .field("block", &self.block.len())
            .field("whitelist", &self.whitelist.len())
            .field("allowlist", &self.allowlist.len())
            .field("log", &self.log.is_some())
            .finish()
    }
}
