mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use deptdir_lib::SiteCatalog;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "deptdir")]
#[command(about = "Extract people records from university department directories")]
struct Cli {
    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Site catalog (TOML) to use instead of the built-in one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and extract directory pages
    Scrape(commands::scrape::ScrapeArgs),
    /// Run one site's adapter on a saved page
    Parse(commands::parse::ParseArgs),
    /// List configured sites and their sources
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("deptdir=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let catalog = match &cli.config {
        Some(path) => SiteCatalog::from_path(path)?,
        None => SiteCatalog::embedded()?,
    };

    match &cli.command {
        Commands::Scrape(args) => commands::scrape::run(args, catalog, &format).await?,
        Commands::Parse(args) => commands::parse::run(args, &catalog, &format)?,
        Commands::Sites => commands::sites::run(&catalog, &format),
    }

    Ok(())
}
