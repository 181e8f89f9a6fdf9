//! Error types for the library layer.

use std::fmt;
use std::path::PathBuf;

use crate::adapters::ExtractError;
use crate::config::ConfigError;

/// Errors produced by the library layer, wrapping transport, configuration
/// and extraction errors and adding filesystem and pagination failures.
#[derive(Debug)]
pub enum DeptDirError {
    /// The site catalog could not be loaded.
    Config(ConfigError),
    /// A page could not be downloaded.
    Fetch(deptdir_fetch::Error),
    /// A page did not have the structure its adapter expects.
    Extract {
        site: String,
        category: String,
        page: u32,
        source: ExtractError,
    },
    /// A filesystem operation failed.
    Io { path: PathBuf, source: std::io::Error },
    /// A record file line could not be (de)serialized.
    Record {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    /// The page count marker was missing or unreadable.
    PageCount { path: PathBuf, reason: String },
    /// No site with this id is configured.
    UnknownSite(String),
}

impl DeptDirError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for download failures, which skip a page instead of aborting a run.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

impl fmt::Display for DeptDirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {}", e),
            Self::Fetch(e) => write!(f, "Download failed: {}", e),
            Self::Extract {
                site,
                category,
                page,
                source,
            } => write!(f, "Extraction failed for {}/{} page {}: {}", site, category, page, source),
            Self::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            Self::Record { path, line, source } => {
                write!(f, "Invalid record at {}:{}: {}", path.display(), line, source)
            }
            Self::PageCount { path, reason } => {
                write!(f, "Cannot read page count from {}: {}", path.display(), reason)
            }
            Self::UnknownSite(id) => write!(f, "Unknown site: {}", id),
        }
    }
}

impl std::error::Error for DeptDirError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Fetch(e) => Some(e),
            Self::Extract { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::Record { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for DeptDirError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<deptdir_fetch::Error> for DeptDirError {
    fn from(e: deptdir_fetch::Error) -> Self {
        Self::Fetch(e)
    }
}
