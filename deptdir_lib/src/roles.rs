//! Ordered label-to-role tables.
//!
//! A table is a list of `(matcher, outcome)` rules evaluated in declared
//! order; the first matching rule decides. A label that matches no rule is
//! *unrecognized*, which is reported separately from a label that matches an
//! `exclude` rule.

use serde::Deserialize;
use thiserror::Error;

use crate::record::RoleTag;

/// Error types for role table construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleTableError {
    #[error("rule #{index} must set exactly one of equals, equals_ignore_case, contains, list_item (found {found})")]
    MatcherCount { index: usize, found: usize },
    #[error("rule #{index} has an empty keyword")]
    EmptyKeyword { index: usize },
    #[error("invalid rule outcome '{0}': expected a role tag or \"exclude\"")]
    InvalidOutcome(String),
}

/// How a rule compares against a raw label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exact match against the trimmed label.
    Equals(String),
    /// Case-insensitive exact match against the trimmed label.
    EqualsIgnoreCase(String),
    /// Case-insensitive substring containment of any keyword in the group.
    Contains(Vec<String>),
    /// The comma-separated label contains this item (e.g. "B.S., Ph.D." has "Ph.D.").
    ListItem(String),
}

impl Matcher {
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim();
        match self {
            Matcher::Equals(value) => label == value,
            Matcher::EqualsIgnoreCase(value) => label.to_lowercase() == *value,
            Matcher::Contains(keywords) => {
                let lower = label.to_lowercase();
                keywords.iter().any(|kw| lower.contains(kw.as_str()))
            }
            Matcher::ListItem(item) => label.split(',').any(|part| part.trim() == item),
        }
    }
}

/// What a matching rule decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Outcome {
    Role(RoleTag),
    /// A known, deliberately out-of-scope category (faculty, admin staff).
    Exclude,
}

impl TryFrom<String> for Outcome {
    type Error = RoleTableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("exclude") {
            return Ok(Outcome::Exclude);
        }
        value
            .parse::<RoleTag>()
            .map(Outcome::Role)
            .map_err(|_| RoleTableError::InvalidOutcome(value))
    }
}

/// One `(matcher, outcome)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRule {
    pub matcher: Matcher,
    pub outcome: Outcome,
}

impl RoleRule {
    pub fn equals(label: &str, outcome: Outcome) -> Self {
        Self {
            matcher: Matcher::Equals(label.trim().to_string()),
            outcome,
        }
    }

    pub fn equals_ignore_case(label: &str, outcome: Outcome) -> Self {
        Self {
            matcher: Matcher::EqualsIgnoreCase(label.trim().to_lowercase()),
            outcome,
        }
    }

    pub fn contains(keywords: &[&str], outcome: Outcome) -> Self {
        Self {
            matcher: Matcher::Contains(keywords.iter().map(|k| k.to_lowercase()).collect()),
            outcome,
        }
    }

    pub fn list_item(item: &str, outcome: Outcome) -> Self {
        Self {
            matcher: Matcher::ListItem(item.trim().to_string()),
            outcome,
        }
    }
}

/// Result of classifying one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleMatch {
    Role(RoleTag),
    Excluded,
    Unrecognized,
}

/// Ordered, first-match-wins rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<RuleSpec>")]
pub struct RoleTable {
    rules: Vec<RoleRule>,
}

impl RoleTable {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    /// Classifies a raw label against the rules in declared order.
    pub fn classify(&self, label: &str) -> RoleMatch {
        for rule in &self.rules {
            if rule.matcher.matches(label) {
                return match rule.outcome {
                    Outcome::Role(tag) => RoleMatch::Role(tag),
                    Outcome::Exclude => RoleMatch::Excluded,
                };
            }
        }
        RoleMatch::Unrecognized
    }
}

/// Rule as written in the site catalog.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(default)]
    pub equals: Option<String>,
    #[serde(default)]
    pub equals_ignore_case: Option<String>,
    #[serde(default)]
    pub contains: Option<Vec<String>>,
    #[serde(default)]
    pub list_item: Option<String>,
    pub tag: Outcome,
}

impl TryFrom<Vec<RuleSpec>> for RoleTable {
    type Error = RoleTableError;

    fn try_from(specs: Vec<RuleSpec>) -> Result<Self, Self::Error> {
        let mut rules = Vec::with_capacity(specs.len());
        for (index, spec) in specs.into_iter().enumerate() {
            let found = [
                spec.equals.is_some(),
                spec.equals_ignore_case.is_some(),
                spec.contains.is_some(),
                spec.list_item.is_some(),
            ]
            .iter()
            .filter(|set| **set)
            .count();
            if found != 1 {
                return Err(RoleTableError::MatcherCount { index, found });
            }

            let rule = if let Some(label) = spec.equals {
                non_empty(&label, index)?;
                RoleRule::equals(&label, spec.tag)
            } else if let Some(label) = spec.equals_ignore_case {
                non_empty(&label, index)?;
                RoleRule::equals_ignore_case(&label, spec.tag)
            } else if let Some(keywords) = spec.contains {
                if keywords.is_empty() {
                    return Err(RoleTableError::EmptyKeyword { index });
                }
                for kw in &keywords {
                    non_empty(kw, index)?;
                }
                let refs: Vec<&str> = keywords.iter().map(String::as_str).collect();
                RoleRule::contains(&refs, spec.tag)
            } else if let Some(item) = spec.list_item {
                non_empty(&item, index)?;
                RoleRule::list_item(&item, spec.tag)
            } else {
                return Err(RoleTableError::MatcherCount { index, found: 0 });
            };
            rules.push(rule);
        }
        Ok(RoleTable { rules })
    }
}

fn non_empty(value: &str, index: usize) -> Result<(), RoleTableError> {
    if value.trim().is_empty() {
        Err(RoleTableError::EmptyKeyword { index })
    } else {
        Ok(())
    }
}
