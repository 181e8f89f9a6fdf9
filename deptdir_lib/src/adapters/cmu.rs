//! Carnegie Mellon University, School of Computer Science.
//!
//! A paginated six-column table. The email column renders the user and the
//! domain in separate spans to defeat naive scrapers.

use scraper::Html;

use super::{check_categories, require_role_tables, Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::config::SiteConfig;
use crate::email::require_pair;
use crate::html::{cell_texts, expect_cells, expect_header, select, select_one, select_optional, text};
use crate::name::require_name;

const TABLE: &str = "table.views-table.cols-6";
const HEADER: [&str; 6] = ["Last", "First", "Title", "Office", "Email", "Phone"];

pub struct Cmu;

impl Adapter for Cmu {
    fn id(&self) -> &'static str {
        "cmu"
    }

    fn categories(&self) -> Categories {
        Categories::Named(&["all"])
    }

    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        check_categories(self.id(), self.categories(), site)?;
        require_role_tables(site, &["position"])
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        if ctx.category != "all" {
            return Err(ctx.unknown_category());
        }
        let positions = ctx.role_table("position")?;
        let doc = Html::parse_document(document);
        let mut page = PageExtraction::new();

        let table = select_one(doc.root_element(), TABLE)?;
        let rows = select(table, "tr")?;
        let header = rows
            .first()
            .ok_or_else(|| ExtractError::Missing(format!("header row of {}", TABLE)))?;
        expect_header(TABLE, &cell_texts(*header, "th")?, &HEADER)?;

        for row in &rows[1..] {
            let cells = expect_cells(*row, "td", HEADER.len())?;
            let last = require_name(&text(cells[0]), "Last column")?;
            let first = require_name(&text(cells[1]), "First column")?;
            let Some(tag) = page.classify(positions, &text(cells[2])) else {
                continue;
            };

            let user = select_optional(cells[4], "span.u")?.map(text).unwrap_or_default();
            let domain = select_optional(cells[4], "span.d")?.map(text).unwrap_or_default();
            let email = require_pair(&user, &domain)?;

            page.push(&format!("{} {}", first, last), tag, email)?;
        }
        Ok(page)
    }
}
