//! Run driver: download, parse and write every page of the configured sites.
//!
//! Pages are handled one at a time. A page that cannot be downloaded is
//! recorded in the report and skipped; a page that does not have the
//! structure its adapter expects aborts the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use deptdir_fetch::{Client, FetchRequest, FetchStats, Method};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::adapters::{self, Adapter, PageContext};
use crate::cache::{exists, CacheOutcome, ExistingPolicy, FetchCache};
use crate::config::{ConfigError, Pagination, SiteCatalog, SiteConfig, SourceConfig, PAGE_PLACEHOLDER};
use crate::error::DeptDirError;
use crate::tally::Tally;
use crate::writer::{read_records, RecordWriter, WriteOutcome};

/// Where pages go and what to do with files left by earlier runs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub download_root: PathBuf,
    pub processed_root: PathBuf,
    pub download_policy: ExistingPolicy,
    pub processed_policy: ExistingPolicy,
}

impl RunOptions {
    /// Reuses downloaded pages and re-parses every page.
    pub fn new(download_root: impl Into<PathBuf>, processed_root: impl Into<PathBuf>) -> Self {
        Self {
            download_root: download_root.into(),
            processed_root: processed_root.into(),
            download_policy: ExistingPolicy::Skip,
            processed_policy: ExistingPolicy::Overwrite,
        }
    }

    pub fn download_path(&self, site: &str, category: &str, page: u32, extension: &str) -> PathBuf {
        self.download_root
            .join(site)
            .join(category)
            .join(format!("page-{}.{}", page, extension))
    }

    pub fn processed_path(&self, site: &str, category: &str, page: u32) -> PathBuf {
        self.processed_root
            .join(site)
            .join(category)
            .join(format!("page-{}.txt", page))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageCounts {
    /// Pages downloaded in this run.
    pub fetched: u32,
    /// Pages served from the download directory.
    pub cache_hits: u32,
    pub written: u32,
    /// Pages not parsed because their artifact already existed.
    pub skipped: u32,
    pub failed: u32,
}

/// A page that could not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub site: String,
    pub category: String,
    pub page: u32,
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub site: String,
    pub tally: Tally,
    pub pages: PageCounts,
    pub failed_pages: Vec<PageFailure>,
}

impl SiteReport {
    fn new(site: &str) -> Self {
        Self {
            site: site.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub sites: Vec<SiteReport>,
    pub fetch: FetchStats,
}

impl RunReport {
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageFailure> {
        self.sites.iter().flat_map(|s| s.failed_pages.iter())
    }

    /// Counters of every site merged together.
    pub fn total(&self) -> Tally {
        let mut total = Tally::new();
        for site in &self.sites {
            total.merge(&site.tally);
        }
        total
    }
}

/// Reads the page count between `prefix` and the next `suffix` in `content`.
pub fn parse_page_count(content: &str, prefix: &str, suffix: &str) -> Result<u32, String> {
    let start = content
        .find(prefix)
        .map(|p| p + prefix.len())
        .ok_or_else(|| format!("marker {:?} not found", prefix))?;
    let len = content[start..]
        .find(suffix)
        .ok_or_else(|| format!("no {:?} after the page count marker", suffix))?;
    let raw = content[start..start + len].trim();
    match raw.parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(format!("page count {:?} is not a positive number", raw)),
    }
}

/// Builds the request for one page. `page` fills the URL placeholder and the
/// configured form field.
fn page_request(source: &SourceConfig, url: &str, page: Option<u32>) -> FetchRequest {
    let url = match page {
        Some(n) => url.replace(PAGE_PLACEHOLDER, &n.to_string()),
        None => url.to_string(),
    };
    let mut request = match source.method {
        Method::Get => FetchRequest::get(url),
        Method::Post => FetchRequest::post(url),
    };
    if let (Some(field), Some(n)) = (source.page_form_field.as_deref(), page) {
        request = request.with_form_param(field, n.to_string());
    }
    request
}

/// Hands out page numbers per category, so sources sharing a category
/// never write to the same file.
#[derive(Default)]
struct PageNumbers(HashMap<String, u32>);

impl PageNumbers {
    fn next(&mut self, category: &str) -> u32 {
        let n = self.0.entry(category.to_string()).or_insert(0);
        *n += 1;
        *n
    }
}

pub struct Driver {
    catalog: SiteCatalog,
    cache: FetchCache,
    writer: RecordWriter,
    options: RunOptions,
}

impl Driver {
    pub fn new(catalog: SiteCatalog, client: Client, options: RunOptions) -> Self {
        Self {
            catalog,
            cache: FetchCache::new(client),
            writer: RecordWriter::new(options.processed_policy),
            options,
        }
    }

    pub fn catalog(&self) -> &SiteCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs the listed sites in order, or every site when `site_ids` is empty.
    ///
    /// Unknown ids are rejected before anything is downloaded.
    pub async fn run(&self, site_ids: &[String]) -> Result<RunReport, DeptDirError> {
        let sites: Vec<&SiteConfig> = if site_ids.is_empty() {
            self.catalog.sites().iter().collect()
        } else {
            site_ids
                .iter()
                .map(|id| {
                    self.catalog
                        .get(id)
                        .ok_or_else(|| DeptDirError::UnknownSite(id.clone()))
                })
                .collect::<Result<_, _>>()?
        };

        let mut reports = Vec::with_capacity(sites.len());
        for site in sites {
            reports.push(self.run_site(site).await?);
        }
        Ok(RunReport {
            sites: reports,
            fetch: self.cache.client().stats(),
        })
    }

    pub async fn run_site(&self, site: &SiteConfig) -> Result<SiteReport, DeptDirError> {
        let adapter = adapters::adapter_for(site.adapter_id()).ok_or_else(|| ConfigError::UnknownAdapter {
            site: site.id.clone(),
            adapter: site.adapter_id().to_string(),
        })?;
        info!(site = %site.id, sources = site.sources.len(), "processing site");

        let mut report = SiteReport::new(&site.id);
        let mut numbers = PageNumbers::default();
        for source in &site.sources {
            self.run_source(site, adapter, source, &mut numbers, &mut report)
                .await?;
        }
        info!(
            site = %site.id,
            records = report.tally.total_records(),
            failed = report.pages.failed,
            "site done"
        );
        Ok(report)
    }

    async fn run_source(
        &self,
        site: &SiteConfig,
        adapter: &dyn Adapter,
        source: &SourceConfig,
        numbers: &mut PageNumbers,
        report: &mut SiteReport,
    ) -> Result<(), DeptDirError> {
        match &source.pagination {
            Pagination::Single => {
                let request = page_request(source, &source.url, None);
                let page = numbers.next(&source.category);
                self.process_page(site, adapter, source, page, &request, report)
                    .await?;
            }
            Pagination::Fixed { count, start } => {
                for i in 0..*count {
                    let request = page_request(source, &source.url, Some(start + i));
                    let page = numbers.next(&source.category);
                    self.process_page(site, adapter, source, page, &request, report)
                        .await?;
                }
            }
            Pagination::List { urls } => {
                for url in urls {
                    let request = page_request(source, url, None);
                    let page = numbers.next(&source.category);
                    self.process_page(site, adapter, source, page, &request, report)
                        .await?;
                }
            }
            Pagination::Marker { prefix, suffix } => {
                let request = page_request(source, &source.url, Some(1));
                let page = numbers.next(&source.category);
                let Some(first) = self
                    .process_page(site, adapter, source, page, &request, report)
                    .await?
                else {
                    warn!(site = %site.id, category = %source.category, "first page unavailable, skipping source");
                    return Ok(());
                };

                let content = read_lossy(&first).await?;
                let count = parse_page_count(&content, prefix, suffix)
                    .map_err(|reason| DeptDirError::PageCount { path: first.clone(), reason })?;
                info!(site = %site.id, category = %source.category, pages = count, "page count");
                for n in 2..=count {
                    let request = page_request(source, &source.url, Some(n));
                    let page = numbers.next(&source.category);
                    self.process_page(site, adapter, source, page, &request, report)
                        .await?;
                }
            }
        }
        Ok(())
    }

    /// Downloads one page and, unless its artifact is kept, parses and writes it.
    ///
    /// Returns the downloaded file, or `None` when the download failed.
    async fn process_page(
        &self,
        site: &SiteConfig,
        adapter: &dyn Adapter,
        source: &SourceConfig,
        page: u32,
        request: &FetchRequest,
        report: &mut SiteReport,
    ) -> Result<Option<PathBuf>, DeptDirError> {
        let category = source.category.as_str();
        debug!(site = %site.id, category, page, request = %request, "page");

        let download = self
            .options
            .download_path(&site.id, category, page, &source.extension);
        let downloaded = match self
            .cache
            .fetch(request, &download, self.options.download_policy)
            .await
        {
            Ok(CacheOutcome::Hit(path)) => {
                report.pages.cache_hits += 1;
                path
            }
            Ok(CacheOutcome::Fetched(path)) => {
                report.pages.fetched += 1;
                path
            }
            Err(e) if e.is_transport() => {
                warn!(site = %site.id, category, page, error = %e, "skipping page");
                report.pages.failed += 1;
                report.failed_pages.push(PageFailure {
                    site: site.id.clone(),
                    category: category.to_string(),
                    page,
                    url: request.url.clone(),
                    error: e.to_string(),
                });
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let processed = self.options.processed_path(&site.id, category, page);
        if self.options.processed_policy == ExistingPolicy::Skip && exists(&processed).await? {
            debug!(path = %processed.display(), "already processed");
            count_kept(&processed, report).await?;
            return Ok(Some(downloaded));
        }

        let content = read_lossy(&downloaded).await?;
        let extraction = {
            let _span = info_span!("page", site = %site.id, category, page).entered();
            adapter
                .parse(&PageContext::new(site, category, page), &content)
                .map_err(|source| DeptDirError::Extract {
                    site: site.id.clone(),
                    category: category.to_string(),
                    page,
                    source,
                })?
        };

        match self.writer.write(&extraction.records, &processed).await? {
            WriteOutcome::Written(_) => {
                report.pages.written += 1;
                report.tally.merge(&extraction.tally);
            }
            WriteOutcome::Skipped(path) => count_kept(&path, report).await?,
        }
        Ok(Some(downloaded))
    }
}

/// Counts the records of an artifact kept from an earlier run.
async fn count_kept(path: &Path, report: &mut SiteReport) -> Result<(), DeptDirError> {
    for record in read_records(path).await? {
        report.tally.count_record(&record);
    }
    report.pages.skipped += 1;
    Ok(())
}

/// Page content as text. Some directories are not served as UTF-8.
async fn read_lossy(path: &Path) -> Result<String, DeptDirError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DeptDirError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
