//! UC Santa Barbara, Computer Science.

use scraper::Html;

use super::{check_categories, require_role_tables, Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::config::SiteConfig;
use crate::html::{cell_texts, expect_cells, expect_header, select, select_one, text};
use crate::name::{reorder_name, require_name};

const TABLE: &str = "table.views-table.cols-6";

const GRAD_HEADER: [&str; 6] = ["Name", "Academic Level", "Phone", "Email", "Office", "Website"];
const ALUMNI_HEADER: [&str; 6] = ["Name", "Degree", "Phone", "Email", "Employer", "Website"];

pub struct Ucsb;

impl Adapter for Ucsb {
    fn id(&self) -> &'static str {
        "ucsb"
    }

    fn categories(&self) -> Categories {
        Categories::Named(&["grad", "grad-alumni"])
    }

    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        check_categories(self.id(), self.categories(), site)?;
        require_role_tables(site, &["level", "degree"])
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        // Current students list one academic level; alumni list every degree earned.
        let (expected_header, table_name) = match ctx.category {
            "grad" => (&GRAD_HEADER, "level"),
            "grad-alumni" => (&ALUMNI_HEADER, "degree"),
            _ => return Err(ctx.unknown_category()),
        };
        let roles = ctx.role_table(table_name)?;
        let doc = Html::parse_document(document);
        let mut page = PageExtraction::new();

        let table = select_one(doc.root_element(), TABLE)?;
        let rows = select(table, "tr")?;
        let header = rows
            .first()
            .ok_or_else(|| ExtractError::Missing(format!("header row of {}", TABLE)))?;
        expect_header(TABLE, &cell_texts(*header, "th")?, expected_header)?;

        for row in &rows[1..] {
            let cells = expect_cells(*row, "td", expected_header.len())?;
            let name = require_name(&text(cells[0]), "Name column")?;
            let Some(tag) = page.classify(roles, &text(cells[1])) else {
                continue;
            };
            let email = Some(text(cells[3])).filter(|e| !e.is_empty());
            page.push(&reorder_name(&name), tag, email)?;
        }
        Ok(page)
    }
}
