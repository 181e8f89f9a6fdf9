//! The `scrape` subcommand: download, extract and write every configured page.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use deptdir_lib::{Client, Driver, ExistingPolicy, RunOptions, SiteCatalog};

use crate::output::{print_json, print_report_table, OutputFormat};

#[derive(Args)]
pub struct ScrapeArgs {
    /// Directory for downloaded pages
    #[arg(long)]
    pub download_dir: PathBuf,

    /// Directory for extracted record files
    #[arg(long)]
    pub processed_dir: PathBuf,

    /// Sites to scrape (default: every configured site)
    pub sites: Vec<String>,

    /// Download pages again even when a copy exists
    #[arg(long)]
    pub overwrite_download: bool,

    /// Keep record files from earlier runs instead of re-parsing their pages
    #[arg(long)]
    pub keep_processed: bool,
}

impl ScrapeArgs {
    fn options(&self) -> RunOptions {
        let mut options = RunOptions::new(self.download_dir.clone(), self.processed_dir.clone());
        options.download_policy = ExistingPolicy::overwrite(self.overwrite_download);
        options.processed_policy = ExistingPolicy::overwrite(!self.keep_processed);
        options
    }
}

pub async fn run(args: &ScrapeArgs, catalog: SiteCatalog, format: &OutputFormat) -> Result<()> {
    let driver = Driver::new(catalog, Client::new()?, args.options());
    let report = driver.run(&args.sites).await?;

    match format {
        OutputFormat::Table => print_report_table(&report),
        OutputFormat::Json => print_json(&report),
    }

    let failed = report.failed_pages().count();
    if failed > 0 {
        eprintln!("{} page(s) could not be downloaded; re-run to retry them", failed);
    }
    eprintln!(
        "Requests: {} made, {} retried, {} failed",
        report.fetch.requests_made, report.fetch.requests_retried, report.fetch.requests_failed
    );
    Ok(())
}
