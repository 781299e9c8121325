//! Request filter subsystem.
//!
//! # Data Flow
//! ```text
//! Filter Compilation (at startup / reload):
//!     FilterConfig
//!     → rules.rs (requestHeaders, whitelistRequestHeaders → RuleSet)
//!     → allowlist.rs (allowedIPs → Allowlist, bad entries skipped)
//!     → engine.rs (frozen HeaderBlock)
//!
//! Per request:
//!     DecisionContext (client IP, headers, target)
//!     → engine.rs: allowlist check
//!     → headers.rs: block rules, then whitelist per offending header
//!     → Verdict (Allow | Deny)
//! ```
//!
//! # Design Decisions
//! - Compiled once, immutable at runtime (thread-safe without locks)
//! - Bad regex is a construction error; bad allowlist entry is not
//! - Diagnostics go to an injected sink, never to the client

pub mod allowlist;
pub mod engine;
pub mod error;
pub mod headers;
pub mod log;
pub mod rules;

pub use allowlist::Allowlist;
pub use engine::{DecisionContext, DenyReason, HeaderBlock, Verdict};
pub use error::{FilterError, FilterResult};
pub use headers::{is_whitelisted, should_block};
pub use log::{DecisionLog, TracingLog};
pub use rules::{Rule, RuleSet};
