//! University of Southern California, Computer Science.
//!
//! The PhD student list is the second table on the page. Its header row uses
//! data cells, and names are written "Last,First".

use scraper::Html;
use tracing::warn;

use super::{Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::email::from_mailto;
use crate::html::{attr, cell_texts, expect_cells, expect_header, select, select_exact, select_optional, text};
use crate::name::last_first;

const HEADER: [&str; 3] = ["Name", "Email", "Faculty Advisor(s)"];

pub struct Usc;

impl Adapter for Usc {
    fn id(&self) -> &'static str {
        "usc"
    }

    fn categories(&self) -> Categories {
        Categories::RoleTags
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let tag = ctx.category_role()?;
        let doc = Html::parse_document(document);
        let mut page = PageExtraction::new();

        let table = select_exact(doc.root_element(), "table", 2)?[1];
        let rows = select(table, "tr")?;
        let header = rows
            .first()
            .ok_or_else(|| ExtractError::Missing("header row".into()))?;
        expect_header("student table", &cell_texts(*header, "td")?, &HEADER)?;

        for row in &rows[1..] {
            let cells = expect_cells(*row, "td", HEADER.len())?;
            let name = last_first(&text(cells[0]))?;

            let mut email = text(cells[1]);
            if let Some(anchor) = select_optional(cells[1], "a")? {
                let href = attr(anchor, "href")?.trim();
                if !href.ends_with(email.as_str()) {
                    // The link is what the page actually sends mail to.
                    if let Some(linked) = from_mailto(href) {
                        warn!(shown = %email, linked = %linked, "email text disagrees with its link, using the link");
                        email = linked;
                    }
                }
            }
            let email = Some(email).filter(|e| !e.is_empty());
            page.push(&name, tag, email)?;
        }
        Ok(page)
    }
}
