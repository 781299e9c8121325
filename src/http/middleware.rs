//! Request filter middleware.
//!
//! Runs the compiled filter once per request. An allowed request is passed to
//! `next` untouched; a denied one is answered with an empty 403 and `next` is
//! never called.

use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::config::FilterConfig;
use crate::filter::{DecisionContext, FilterResult, HeaderBlock, Verdict};
use crate::http::response::forbidden;
use crate::observability::metrics;

/// Shared handle to the live filter. Cloning shares the same filter.
#[derive(Clone)]
pub struct FilterState {
    filter: Arc<ArcSwap<HeaderBlock>>,
}

impl FilterState {
    pub fn new(filter: HeaderBlock) -> Self {
        Self {
            filter: Arc::new(ArcSwap::from_pointee(filter)),
        }
    }

    /// Snapshot of the filter in effect right now.
    pub fn current(&self) -> Arc<HeaderBlock> {
        self.filter.load_full()
    }

    /// Compile `config` and swap it in. On error the running filter stays.
    pub fn reload(&self, config: &FilterConfig) -> FilterResult<()> {
        match HeaderBlock::new(config) {
            Ok(filter) => {
                tracing::info!(
                    block_rules = filter.block_rules().len(),
                    whitelist_rules = filter.whitelist_rules().len(),
                    allowed_networks = filter.allowlist().len(),
                    "Filter reloaded"
                );
                self.filter.store(Arc::new(filter));
                metrics::record_reload(true);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Filter reload rejected, keeping current filter");
                metrics::record_reload(false);
                Err(e)
            }
        }
    }
}

/// Middleware entry point for `axum::middleware::from_fn_with_state`.
///
/// The client address comes from `ConnectInfo<SocketAddr>`; without it the
/// client is unknown and an allowlist rejects the request.
pub async fn header_block_middleware(
    State(state): State<FilterState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let verdict = {
        let filter = state.filter.load();
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let target = request.uri().to_string();

        filter.evaluate(&DecisionContext {
            client,
            headers: request.headers(),
            target: &target,
        })
    };

    metrics::record_decision(&verdict);

    match verdict {
        Verdict::Allow => next.run(request).await,
        Verdict::Deny(_) => forbidden(),
    }
}
