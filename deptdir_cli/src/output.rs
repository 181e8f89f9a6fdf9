use deptdir_lib::{Pagination, Record, RunReport, SiteCatalog, Tally};
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled, Serialize)]
struct SiteRow {
    #[tabled(rename = "Site")]
    #[serde(rename = "Site")]
    site: String,
    #[tabled(rename = "Records")]
    #[serde(rename = "Records")]
    records: u64,
    #[tabled(rename = "With email")]
    #[serde(rename = "With email")]
    with_email: u64,
    #[tabled(rename = "Excluded")]
    #[serde(rename = "Excluded")]
    excluded: u64,
    #[tabled(rename = "Unrecognized")]
    #[serde(rename = "Unrecognized")]
    unrecognized: u64,
    #[tabled(rename = "Emails dropped")]
    #[serde(rename = "Emails dropped")]
    emails_dropped: u64,
    #[tabled(rename = "Pages")]
    #[serde(rename = "Pages")]
    pages: String,
}

#[derive(Tabled, Serialize)]
struct RoleRow {
    #[tabled(rename = "Role")]
    #[serde(rename = "Role")]
    role: String,
    #[tabled(rename = "Records")]
    #[serde(rename = "Records")]
    records: u64,
    #[tabled(rename = "With email")]
    #[serde(rename = "With email")]
    with_email: u64,
}

#[derive(Tabled, Serialize)]
struct FailureRow {
    #[tabled(rename = "Site")]
    #[serde(rename = "Site")]
    site: String,
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Page")]
    #[serde(rename = "Page")]
    page: u32,
    #[tabled(rename = "Error")]
    #[serde(rename = "Error")]
    error: String,
}

#[derive(Tabled, Serialize)]
struct RecordRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Email")]
    #[serde(rename = "Email")]
    email: String,
}

#[derive(Tabled, Serialize)]
pub struct SourceRow {
    #[tabled(rename = "Site")]
    #[serde(rename = "Site")]
    site: String,
    #[tabled(rename = "Adapter")]
    #[serde(rename = "Adapter")]
    adapter: String,
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Method")]
    #[serde(rename = "Method")]
    method: String,
    #[tabled(rename = "Pages")]
    #[serde(rename = "Pages")]
    pages: String,
    #[tabled(rename = "URL")]
    #[serde(rename = "URL")]
    url: String,
}

// -- Row builders --

fn build_site_rows(report: &RunReport) -> Vec<SiteRow> {
    report
        .sites
        .iter()
        .map(|s| SiteRow {
            site: s.site.clone(),
            records: s.tally.total_records(),
            with_email: s.tally.total_with_email(),
            excluded: s.tally.excluded,
            unrecognized: s.tally.unrecognized,
            emails_dropped: s.tally.emails_dropped,
            pages: format!(
                "{} written, {} kept, {} failed ({} downloaded, {} cached)",
                s.pages.written, s.pages.skipped, s.pages.failed, s.pages.fetched, s.pages.cache_hits
            ),
        })
        .collect()
}

fn build_role_rows(tally: &Tally) -> Vec<RoleRow> {
    tally
        .roles
        .iter()
        .map(|(tag, count)| RoleRow {
            role: tag.to_string(),
            records: count.records,
            with_email: count.with_email,
        })
        .collect()
}

fn build_failure_rows(report: &RunReport) -> Vec<FailureRow> {
    report
        .failed_pages()
        .map(|f| FailureRow {
            site: f.site.clone(),
            category: f.category.clone(),
            page: f.page,
            error: f.error.clone(),
        })
        .collect()
}

fn build_record_rows(records: &[Record]) -> Vec<RecordRow> {
    records
        .iter()
        .map(|r| RecordRow {
            name: r.name.clone(),
            title: r.title.to_string(),
            email: r.email.clone().unwrap_or_default(),
        })
        .collect()
}

fn describe_pages(pagination: &Pagination) -> String {
    match pagination {
        Pagination::Single => "1".to_string(),
        Pagination::Fixed { count, start } => format!("{} (from {})", count, start),
        Pagination::Marker { .. } => "read from page 1".to_string(),
        Pagination::List { urls } => urls.len().to_string(),
    }
}

pub fn build_source_rows(catalog: &SiteCatalog) -> Vec<SourceRow> {
    catalog
        .sites()
        .iter()
        .flat_map(|site| {
            site.sources.iter().map(move |source| SourceRow {
                site: site.id.clone(),
                adapter: site.adapter_id().to_string(),
                category: source.category.clone(),
                method: source.method.to_string(),
                pages: describe_pages(&source.pagination),
                url: match &source.pagination {
                    Pagination::List { urls } => urls.first().cloned().unwrap_or_default(),
                    _ => source.url.clone(),
                },
            })
        })
        .collect()
}

// -- Table output --

pub fn print_report_table(report: &RunReport) {
    println!("{}", Table::new(build_site_rows(report)));
    let roles = build_role_rows(&report.total());
    if !roles.is_empty() {
        println!("{}", Table::new(roles));
    }
    let failures = build_failure_rows(report);
    if !failures.is_empty() {
        println!("{}", Table::new(failures));
    }
}

pub fn print_records_table(records: &[Record]) {
    println!("{}", Table::new(build_record_rows(records)));
}

pub fn print_sources_table(catalog: &SiteCatalog) {
    println!("{}", Table::new(build_source_rows(catalog)));
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
