//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Reject header patterns that are not valid regular expressions
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Malformed `allowedIPs` entries are not errors; the filter skips them

use std::net::SocketAddr;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, HeaderConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("upstream.address must not be empty")]
    EmptyUpstream,

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("observability.log_format `{0}` is not one of: pretty, json")]
    UnknownLogFormat(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("filter.{list}[{index}].{field}: invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        list: &'static str,
        index: usize,
        field: &'static str,
        pattern: String,
        reason: String,
    },
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.address.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstream);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let format = config.observability.log_format.as_str();
    if format != "pretty" && format != "json" {
        errors.push(ValidationError::UnknownLogFormat(format.to_string()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    check_patterns("requestHeaders", &config.filter.request_headers, &mut errors);
    check_patterns(
        "whitelistRequestHeaders",
        &config.filter.whitelist_request_headers,
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_patterns(list: &'static str, entries: &[HeaderConfig], errors: &mut Vec<ValidationError>) {
    for (index, entry) in entries.iter().enumerate() {
        for (field, pattern) in [("header", &entry.name), ("env", &entry.value)] {
            if pattern.is_empty() {
                continue;
            }
            if let Err(e) = Regex::new(pattern) {
                errors.push(ValidationError::InvalidPattern {
                    list,
                    index,
                    field,
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}
