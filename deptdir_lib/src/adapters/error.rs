//! Extraction failures. Every variant aborts the page being parsed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// An anchor selector matched the wrong number of elements.
    #[error("expected {expected} {anchor}, found {found}")]
    AnchorCount {
        anchor: String,
        expected: usize,
        found: usize,
    },
    /// A header row does not carry the expected column labels.
    #[error("unexpected header in {anchor}: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        anchor: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A required element or attribute is absent.
    #[error("missing {0}")]
    Missing(String),
    /// An element is present but its content has the wrong shape.
    #[error("malformed {what}: {detail}")]
    Malformed { what: String, detail: String },
    #[error("empty name in {0}")]
    EmptyName(String),
    #[error("invalid selector {css:?}: {reason}")]
    Selector { css: String, reason: String },
    /// The page category is not one this adapter knows how to parse.
    #[error("adapter {adapter} has no page kind for category '{category}'")]
    UnknownCategory { adapter: String, category: String },
    /// The site configuration lacks something the adapter needs.
    #[error("site configuration is missing {0}")]
    Config(String),
}
