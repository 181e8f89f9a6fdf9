//! The `sites` subcommand: list the site catalog.

use deptdir_lib::SiteCatalog;

use crate::output::{print_json, print_sources_table, OutputFormat};

pub fn run(catalog: &SiteCatalog, format: &OutputFormat) {
    match format {
        OutputFormat::Table => print_sources_table(catalog),
        OutputFormat::Json => print_json(&crate::output::build_source_rows(catalog)),
    }
}
