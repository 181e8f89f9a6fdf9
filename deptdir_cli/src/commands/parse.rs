//! The `parse` subcommand: run one adapter on a saved page, without network access.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use deptdir_lib::{adapter_for, DeptDirError, PageContext, SiteCatalog};

use crate::output::{print_json, print_records_table, OutputFormat};

#[derive(Args)]
pub struct ParseArgs {
    /// Site whose adapter reads the page
    #[arg(long)]
    pub site: String,

    /// Page category (e.g. grad, dir, phd-alumni)
    #[arg(long)]
    pub category: String,

    /// Page number, used in diagnostics
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Saved page to parse
    pub file: PathBuf,
}

pub fn run(args: &ParseArgs, catalog: &SiteCatalog, format: &OutputFormat) -> Result<()> {
    let site = catalog
        .get(&args.site)
        .ok_or_else(|| DeptDirError::UnknownSite(args.site.clone()))?;
    let adapter = adapter_for(site.adapter_id())
        .ok_or_else(|| anyhow!("site {} names unknown adapter {}", site.id, site.adapter_id()))?;

    let bytes = std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let document = String::from_utf8_lossy(&bytes);

    let page = adapter
        .parse(&PageContext::new(site, &args.category, args.page), &document)
        .map_err(|source| DeptDirError::Extract {
            site: site.id.clone(),
            category: args.category.clone(),
            page: args.page,
            source,
        })?;

    match format {
        OutputFormat::Table => print_records_table(&page.records),
        OutputFormat::Json => print_json(&page.records),
    }
    eprintln!(
        "{} records ({} with email), {} excluded, {} unrecognized, {} emails dropped",
        page.tally.total_records(),
        page.tally.total_with_email(),
        page.tally.excluded,
        page.tally.unrecognized,
        page.tally.emails_dropped
    );
    Ok(())
}
