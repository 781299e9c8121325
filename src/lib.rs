//! HTTP request filtering gateway library.
//!
//! Rejects requests by client IP allowlist and by header name/value rules,
//! with whitelist rules carving exceptions out of blocked headers.

pub mod config;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use filter::{HeaderBlock, Verdict};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
