//! Filter construction errors.

use thiserror::Error;

/// Which configured rule list a pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleList {
    /// `requestHeaders`
    Block,
    /// `whitelistRequestHeaders`
    Whitelist,
}

impl std::fmt::Display for RuleList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleList::Block => write!(f, "requestHeaders"),
            RuleList::Whitelist => write!(f, "whitelistRequestHeaders"),
        }
    }
}

/// Which half of a rule a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternField {
    /// The `header` (name) pattern.
    Name,
    /// The `env` (value) pattern.
    Value,
}

impl std::fmt::Display for PatternField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternField::Name => write!(f, "header"),
            PatternField::Value => write!(f, "env"),
        }
    }
}

/// Errors that prevent a filter from being built.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A header or value pattern is not a valid regular expression.
    #[error("{list}[{index}].{field}: invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        list: RuleList,
        index: usize,
        field: PatternField,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for filter construction.
pub type FilterResult<T> = Result<T, FilterError>;
