//! UC Irvine, Donald Bren School of Information and Computer Sciences.
//!
//! One single-column table; each cell is a mailto link with the person's
//! name, optionally followed by `| Website`.

use scraper::Html;

use super::{Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::email::{from_mailto, MAILTO_PREFIX};
use crate::html::{attr, expect_cells, select, select_one, text};
use crate::name::reorder_name;

const WEBSITE_SUFFIX: &str = "Website";

pub struct Uci;

impl Adapter for Uci {
    fn id(&self) -> &'static str {
        "uci"
    }

    fn categories(&self) -> Categories {
        Categories::RoleTags
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let tag = ctx.category_role()?;
        let doc = Html::parse_document(document);
        let mut page = PageExtraction::new();

        let table = select_one(doc.root_element(), "table")?;
        for row in select(table, "tr")? {
            let cell = expect_cells(row, "td", 1)?[0];
            let name = strip_website(&text(cell))?;

            let anchor = select(cell, "a")?
                .into_iter()
                .next()
                .ok_or_else(|| ExtractError::Missing(format!("link in entry {:?}", name)))?;
            let href = attr(anchor, "href")?;
            let is_mailto = href
                .trim()
                .get(..MAILTO_PREFIX.len())
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case(MAILTO_PREFIX));
            if !is_mailto {
                return Err(ExtractError::Malformed {
                    what: "entry link".into(),
                    detail: format!("first link of {:?} is not a mailto link: {:?}", name, href),
                });
            }
            page.push(&reorder_name(&name), tag, from_mailto(href))?;
        }
        Ok(page)
    }
}

/// Drops a trailing `| Website` marker; anything else after a bar is unexpected.
fn strip_website(raw: &str) -> Result<String, ExtractError> {
    match raw.split_once('|') {
        None => Ok(raw.trim().to_string()),
        Some((name, rest)) if rest.trim() == WEBSITE_SUFFIX => Ok(name.trim().to_string()),
        Some((_, rest)) => Err(ExtractError::Malformed {
            what: "entry".into(),
            detail: format!("unexpected text after '|': {:?}", rest.trim()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_marker_is_stripped() {
        assert_eq!(strip_website("Jane Doe | Website").unwrap(), "Jane Doe");
        assert_eq!(strip_website("Jane Doe").unwrap(), "Jane Doe");
        assert!(strip_website("Jane Doe | Blog").is_err());
    }
}
