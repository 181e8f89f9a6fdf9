//! Site catalog: which sites exist, where their pages live and how to read them.
//!
//! The catalog is TOML. A built-in copy is compiled into the library from
//! `seed_data/sites.toml`; callers may load their own with [`SiteCatalog::from_path`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use deptdir_fetch::Method;
use serde::Deserialize;
use thiserror::Error;

use crate::adapters::{self, ExtractError};
use crate::roles::RoleTable;

const EMBEDDED_CATALOG: &str = include_str!("../seed_data/sites.toml");

/// Placeholder replaced by the page number in paginated URLs.
pub const PAGE_PLACEHOLDER: &str = "{page}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read site catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid site catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate site id '{0}'")]
    DuplicateSite(String),
    #[error("site {site}: unknown adapter '{adapter}'")]
    UnknownAdapter { site: String, adapter: String },
    #[error("site {site}: {reason}")]
    InvalidSource { site: String, reason: String },
    #[error("site {site}: {source}")]
    Adapter {
        site: String,
        #[source]
        source: ExtractError,
    },
}

/// How a source's pages are enumerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pagination {
    /// One page at the source URL.
    #[default]
    Single,
    /// `count` pages; the page parameter runs from `start` to `start + count - 1`.
    Fixed {
        count: u32,
        #[serde(default)]
        start: u32,
    },
    /// Page count read from the first page, between `prefix` and `suffix`.
    Marker { prefix: String, suffix: String },
    /// An explicit list of page URLs.
    List { urls: Vec<String> },
}

/// One downloadable listing of a site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub category: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: Method,
    /// Form field carrying the page number in POST requests.
    #[serde(default)]
    pub page_form_field: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub pagination: Pagination,
}

fn default_extension() -> String {
    "html".to_string()
}

/// How the generic table adapter orders names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameOrder {
    /// Use the cell text as is.
    AsIs,
    /// Reorder "Last, First" when a comma is present.
    #[default]
    Reorder,
    /// Require "Last, First".
    LastFirst,
}

/// Layout of a plain directory table, for the generic `table` adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableLayout {
    /// CSS selector matching exactly one table.
    #[serde(default = "default_table_selector")]
    pub selector: String,
    /// Expected header labels, in order.
    pub header: Vec<String>,
    /// Cell tag of the header row.
    #[serde(default = "default_header_cell")]
    pub header_cell: String,
    pub name_column: usize,
    #[serde(default)]
    pub name_order: NameOrder,
    /// Column holding the role label; requires `role_table`.
    #[serde(default)]
    pub role_column: Option<usize>,
    #[serde(default)]
    pub role_table: Option<String>,
    #[serde(default)]
    pub email_column: Option<usize>,
}

fn default_table_selector() -> String {
    "table".to_string()
}

fn default_header_cell() -> String {
    "th".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    adapter: Option<String>,
    /// Domain appended to bare user names.
    #[serde(default)]
    pub email_domain: Option<String>,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub roles: BTreeMap<String, RoleTable>,
    #[serde(default)]
    pub table: Option<TableLayout>,
}

impl SiteConfig {
    /// The adapter parsing this site's pages; the site id unless overridden.
    pub fn adapter_id(&self) -> &str {
        self.adapter.as_deref().unwrap_or(&self.id)
    }

    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for source in &self.sources {
            if !seen.contains(&source.category.as_str()) {
                seen.push(source.category.as_str());
            }
        }
        seen
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default, rename = "site")]
    sites: Vec<SiteConfig>,
}

/// Validated set of configured sites, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteCatalog {
    sites: Vec<SiteConfig>,
}

impl SiteCatalog {
    /// The catalog compiled into the library.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::parse(EMBEDDED_CATALOG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(text)?;
        let catalog = SiteCatalog { sites: file.sites };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn sites(&self) -> &[SiteConfig] {
        &self.sites
    }

    pub fn get(&self, id: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|site| site.id == id)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for site in &self.sites {
            if !ids.insert(site.id.as_str()) {
                return Err(ConfigError::DuplicateSite(site.id.clone()));
            }
            let adapter = adapters::adapter_for(site.adapter_id()).ok_or_else(|| {
                ConfigError::UnknownAdapter {
                    site: site.id.clone(),
                    adapter: site.adapter_id().to_string(),
                }
            })?;
            if site.sources.is_empty() {
                return Err(invalid(site, "no sources configured".to_string()));
            }
            for source in &site.sources {
                validate_source(site, source)?;
            }
            adapter.validate(site).map_err(|source| ConfigError::Adapter {
                site: site.id.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

fn invalid(site: &SiteConfig, reason: String) -> ConfigError {
    ConfigError::InvalidSource {
        site: site.id.clone(),
        reason,
    }
}

fn validate_source(site: &SiteConfig, source: &SourceConfig) -> Result<(), ConfigError> {
    let category = &source.category;
    if category.trim().is_empty() || category.contains(['/', '\\']) || category.starts_with('.') {
        return Err(invalid(site, format!("invalid category '{}'", category)));
    }
    if source.extension.is_empty() || source.extension.contains(['/', '\\', '.']) {
        return Err(invalid(
            site,
            format!("source {}: invalid extension '{}'", category, source.extension),
        ));
    }
    if source.page_form_field.is_some() && source.method != Method::Post {
        return Err(invalid(
            site,
            format!("source {}: page_form_field requires method POST", category),
        ));
    }
    let pages_in_form = source.method == Method::Post && source.page_form_field.is_some();

    match &source.pagination {
        Pagination::List { urls } => {
            if urls.is_empty() {
                return Err(invalid(site, format!("source {}: empty url list", category)));
            }
            if !source.url.is_empty() {
                return Err(invalid(
                    site,
                    format!("source {}: list pagination takes urls, not url", category),
                ));
            }
        }
        other => {
            if source.url.is_empty() {
                return Err(invalid(site, format!("source {}: missing url", category)));
            }
            if let Pagination::Fixed { count, .. } = other {
                if *count == 0 {
                    return Err(invalid(site, format!("source {}: page count is zero", category)));
                }
            }
            if !matches!(other, Pagination::Single) && !pages_in_form && !source.url.contains(PAGE_PLACEHOLDER) {
                return Err(invalid(
                    site,
                    format!(
                        "source {}: paged source needs {} in the url or a POST page_form_field",
                        category, PAGE_PLACEHOLDER
                    ),
                ));
            }
            if let Pagination::Marker { prefix, suffix } = other {
                if prefix.is_empty() || suffix.is_empty() {
                    return Err(invalid(
                        site,
                        format!("source {}: page count marker needs a prefix and a suffix", category),
                    ));
                }
            }
        }
    }
    Ok(())
}
