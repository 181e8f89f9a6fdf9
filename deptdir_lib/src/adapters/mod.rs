//! Per-institution extraction of person records from directory pages.
//!
//! Each adapter is a unit struct implementing [`Adapter`]. Adapters are pure:
//! they receive a document and a [`PageContext`] and return the page's
//! records with a [`Tally`], or fail with an [`ExtractError`] when the page
//! does not have the structure they expect.

mod error;

pub mod brown;
pub mod caltech;
pub mod cmu;
pub mod columbia;
pub mod stanford;
pub mod table;
pub mod uci;
pub mod ucsb;
pub mod ucsd;
pub mod umass;
pub mod usc;
pub mod wisc;

pub use error::ExtractError;

use tracing::{debug, warn};

use crate::config::SiteConfig;
use crate::email;
use crate::name::normalize_ws;
use crate::record::{Record, RoleTag};
use crate::roles::{RoleMatch, RoleTable};
use crate::tally::Tally;

/// Page categories an adapter can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Categories {
    /// A fixed set of page kinds, e.g. `grad` and `dir`.
    Named(&'static [&'static str]),
    /// Any role tag; the whole page is one role.
    RoleTags,
}

impl Categories {
    pub fn accepts(&self, category: &str) -> bool {
        match self {
            Categories::Named(names) => names.contains(&category),
            Categories::RoleTags => category.parse::<RoleTag>().is_ok(),
        }
    }
}

/// A site-specific parser from one document shape to records.
pub trait Adapter: Send + Sync {
    /// Stable identifier, referenced by `adapter = "..."` in the site catalog.
    fn id(&self) -> &'static str;

    fn categories(&self) -> Categories;

    /// Checks that a site configuration carries everything this adapter
    /// reads at parse time, so that gaps surface when the catalog loads.
    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        check_categories(self.id(), self.categories(), site)
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError>;
}

/// Errors on the first source whose category the adapter cannot parse.
pub fn check_categories(
    adapter: &str,
    categories: Categories,
    site: &SiteConfig,
) -> Result<(), ExtractError> {
    for source in &site.sources {
        if !categories.accepts(&source.category) {
            return Err(ExtractError::UnknownCategory {
                adapter: adapter.to_string(),
                category: source.category.clone(),
            });
        }
    }
    Ok(())
}

/// Errors unless the site defines every named role table.
pub fn require_role_tables(site: &SiteConfig, names: &[&str]) -> Result<(), ExtractError> {
    for name in names {
        if !site.roles.contains_key(*name) {
            return Err(ExtractError::Config(format!("role table '{}'", name)));
        }
    }
    Ok(())
}

pub fn require_email_domain(site: &SiteConfig) -> Result<(), ExtractError> {
    match site.email_domain.as_deref() {
        Some(domain) if !domain.trim().is_empty() => Ok(()),
        _ => Err(ExtractError::Config("email_domain".to_string())),
    }
}

/// Everything an adapter knows about the page besides its content.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub site: &'a SiteConfig,
    pub category: &'a str,
    pub page: u32,
}

impl<'a> PageContext<'a> {
    pub fn new(site: &'a SiteConfig, category: &'a str, page: u32) -> Self {
        Self { site, category, page }
    }

    pub fn role_table(&self, name: &str) -> Result<&'a RoleTable, ExtractError> {
        self.site
            .roles
            .get(name)
            .ok_or_else(|| ExtractError::Config(format!("role table '{}' for site {}", name, self.site.id)))
    }

    pub fn email_domain(&self) -> Result<&'a str, ExtractError> {
        self.site
            .email_domain
            .as_deref()
            .ok_or_else(|| ExtractError::Config(format!("email_domain for site {}", self.site.id)))
    }

    /// The category read as a role tag, for sites whose pages each list one role.
    pub fn category_role(&self) -> Result<RoleTag, ExtractError> {
        self.category
            .parse::<RoleTag>()
            .map_err(|_| self.unknown_category())
    }

    pub fn unknown_category(&self) -> ExtractError {
        ExtractError::UnknownCategory {
            adapter: self.site.adapter_id().to_string(),
            category: self.category.to_string(),
        }
    }
}

/// Records of one page, in document order, with the page's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub records: Vec<Record>,
    pub tally: Tally,
}

impl PageExtraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one record.
    ///
    /// The name is whitespace-normalized and must be non-empty. An email that
    /// is not a plausible address is dropped and counted; the record is kept.
    pub fn push(&mut self, name: &str, title: RoleTag, email: Option<String>) -> Result<(), ExtractError> {
        let name = normalize_ws(name);
        if name.is_empty() {
            return Err(ExtractError::EmptyName(format!("{} entry", title)));
        }
        let email = match email {
            Some(address) if email::is_plausible(&address) => Some(address),
            Some(address) => {
                warn!(name = %name, email = %address, "dropping implausible email");
                self.tally.emails_dropped += 1;
                None
            }
            None => None,
        };
        let record = Record { name, title, email };
        self.tally.count_record(&record);
        self.records.push(record);
        Ok(())
    }

    /// Turns a role lookup into a tag, counting entries that are skipped.
    pub fn resolve(&mut self, matched: RoleMatch, label: &str) -> Option<RoleTag> {
        match matched {
            RoleMatch::Role(tag) => Some(tag),
            RoleMatch::Excluded => {
                debug!(label, "skipping excluded role");
                self.tally.excluded += 1;
                None
            }
            RoleMatch::Unrecognized => {
                warn!(label, "skipping unrecognized role label");
                self.tally.unrecognized += 1;
                None
            }
        }
    }

    /// Classifies `label` with `table` and resolves the outcome.
    pub fn classify(&mut self, table: &RoleTable, label: &str) -> Option<RoleTag> {
        self.resolve(table.classify(label), label)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

static ADAPTERS: [&dyn Adapter; 12] = [
    &brown::Brown,
    &caltech::Caltech,
    &cmu::Cmu,
    &columbia::Columbia,
    &stanford::Stanford,
    &uci::Uci,
    &ucsb::Ucsb,
    &ucsd::Ucsd,
    &umass::Umass,
    &usc::Usc,
    &wisc::Wisc,
    &table::Table,
];

/// Every built-in adapter.
pub fn all() -> &'static [&'static dyn Adapter] {
    &ADAPTERS
}

pub fn adapter_for(id: &str) -> Option<&'static dyn Adapter> {
    ADAPTERS.iter().copied().find(|adapter| adapter.id() == id)
}

/// A site from the built-in catalog, for adapter unit tests.
#[cfg(test)]
pub(crate) fn test_site(id: &str) -> SiteConfig {
    crate::config::SiteCatalog::embedded()
        .expect("embedded catalog")
        .get(id)
        .expect("site in embedded catalog")
        .clone()
}
