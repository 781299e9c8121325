//! Header block and whitelist evaluation.
//!
//! # Responsibilities
//! - Decide whether a single block rule matches a header
//! - Decide whether a blocked header is carved out by a whitelist rule
//! - Find the first header of a request that stays blocked
//!
//! # Design Decisions
//! - Each header's fate depends only on its own name and values
//! - A rule with both patterns gates on both; a failed name never falls
//!   through to a value-only check
//! - Names are matched in canonical form (`X-Custom-Header`)
//! - `Host` is request routing, not a header rules can target

use std::borrow::Cow;

use axum::http::{header, HeaderMap, HeaderName};

use crate::filter::rules::{Rule, RuleSet};

/// Whether `rule` blocks the header `name` carrying `values`.
pub fn should_block<V: AsRef<str>>(name: &str, values: &[V], rule: &Rule) -> bool {
    let name_match = rule.name_matches(name);

    match rule.value_pattern() {
        None => name_match,
        Some(_) if name_match || rule.name_pattern().is_none() => rule.any_value_matches(values),
        Some(_) => false,
    }
}

/// Whether some whitelist rule lets the header `name` through.
pub fn is_whitelisted<V: AsRef<str>>(name: &str, values: &[V], whitelist: &RuleSet) -> bool {
    whitelist.iter().any(|rule| {
        if !rule.name_applies(name) {
            return false;
        }
        match rule.value_pattern() {
            None => true,
            Some(_) => rule.any_value_matches(values),
        }
    })
}

/// Outcome of scanning one request's headers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderScan {
    /// First header that matched a block rule and no whitelist rule.
    pub blocked: Option<String>,
    /// Headers that matched a block rule but were whitelisted, in scan order.
    pub whitelisted: Vec<String>,
}

/// Check every header against every block rule, stopping at the first
/// header that is blocked and not whitelisted.
pub fn scan(headers: &HeaderMap, block: &RuleSet, whitelist: &RuleSet) -> HeaderScan {
    let mut result = HeaderScan::default();
    if block.is_empty() {
        return result;
    }

    for key in headers.keys() {
        if *key == header::HOST {
            continue;
        }
        let name = canonical_name(key);
        let values = header_values(headers, key);

        for rule in block {
            if !should_block(&name, &values, rule) {
                continue;
            }
            if is_whitelisted(&name, &values, whitelist) {
                result.whitelisted.push(name.clone());
                continue;
            }
            result.blocked = Some(name);
            return result;
        }
    }

    result
}

/// All values of one header, in order, as text.
fn header_values<'a>(headers: &'a HeaderMap, key: &HeaderName) -> Vec<Cow<'a, str>> {
    headers
        .get_all(key)
        .iter()
        .map(|v| match v.to_str() {
            Ok(s) => Cow::Borrowed(s),
            Err(_) => String::from_utf8_lossy(v.as_bytes()),
        })
        .collect()
}

/// Canonical MIME form of a header name: first letter and every letter
/// after a hyphen upper-cased, the rest lower-cased.
pub fn canonical_name(name: &HeaderName) -> String {
    let mut out = String::with_capacity(name.as_str().len());
    let mut upper = true;

    for c in name.as_str().chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }

    out
}
