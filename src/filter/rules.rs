//! Header rule compilation.
//!
//! # Responsibilities
//! - Compile `{header, env}` pattern pairs into regex-backed rules
//! - Treat empty pattern strings as absent
//! - Reject malformed patterns at construction time
//!
//! # Design Decisions
//! - Compiled once, immutable afterwards, shared across requests
//! - Configuration order is preserved
//! - An absent pattern matches nothing; callers decide what absence means

use regex::Regex;

use crate::config::HeaderConfig;
use crate::filter::error::{FilterError, FilterResult, PatternField, RuleList};

/// A compiled header rule.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    name: Option<Regex>,
    value: Option<Regex>,
}

impl Rule {
    /// Build a rule from already compiled patterns.
    pub fn new(name: Option<Regex>, value: Option<Regex>) -> Self {
        Self { name, value }
    }

    pub fn name_pattern(&self) -> Option<&Regex> {
        self.name.as_ref()
    }

    pub fn value_pattern(&self) -> Option<&Regex> {
        self.value.as_ref()
    }

    /// True when the rule has a name pattern and it matches `name`.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// True when the rule has no name pattern, or its name pattern matches.
    pub(crate) fn name_applies(&self, name: &str) -> bool {
        self.name.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// True when the rule has a value pattern and any of `values` matches it.
    pub fn any_value_matches<V: AsRef<str>>(&self, values: &[V]) -> bool {
        match &self.value {
            Some(re) => values.iter().any(|v| re.is_match(v.as_ref())),
            None => false,
        }
    }

    /// A rule with neither pattern never matches anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.value.is_none()
    }
}

/// An ordered, immutable list of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile raw configuration entries into a rule set.
    pub fn compile(list: RuleList, entries: &[HeaderConfig]) -> FilterResult<Self> {
        let mut rules = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let name = compile_pattern(list, index, PatternField::Name, &entry.name)?;
            let value = compile_pattern(list, index, PatternField::Value, &entry.value)?;
            rules.push(Rule { name, value });
        }

        Ok(Self { rules })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

fn compile_pattern(
    list: RuleList,
    index: usize,
    field: PatternField,
    pattern: &str,
) -> FilterResult<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }

    Regex::new(pattern)
        .map(Some)
        .map_err(|source| FilterError::InvalidPattern {
            list,
            index,
            field,
            pattern: pattern.to_string(),
            source,
        })
}
