//! Columbia University, Computer Science.
//!
//! One page of sections, each introduced by a named anchor and followed by a
//! four-column table. Addresses are written by an inline `hideemail(...)`
//! script call.

use scraper::Html;
use tracing::debug;

use super::{check_categories, require_role_tables, Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::config::SiteConfig;
use crate::email::ScriptEmail;
use crate::html::{attr, expect_cells, next_sibling, select, select_optional, text};
use crate::name::last_first;
use crate::roles::RoleMatch;

const HIDE_EMAIL: ScriptEmail = ScriptEmail {
    prefix: "hideemail(",
    user_arg: 1,
    domain_arg: 2,
    arity: Some(5),
};

const COLUMNS: usize = 4;

pub struct Columbia;

impl Adapter for Columbia {
    fn id(&self) -> &'static str {
        "columbia"
    }

    fn categories(&self) -> Categories {
        Categories::Named(&["all"])
    }

    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        check_categories(self.id(), self.categories(), site)?;
        require_role_tables(site, &["section"])
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        if ctx.category != "all" {
            return Err(ctx.unknown_category());
        }
        let sections = ctx.role_table("section")?;
        let doc = Html::parse_document(document);
        let mut page = PageExtraction::new();

        for anchor in select(doc.root_element(), "a[name]")? {
            let section = attr(anchor, "name")?;
            let matched = sections.classify(section);
            if matched == RoleMatch::Unrecognized {
                // Named anchors also mark in-page targets that are not sections.
                debug!(section, "ignoring anchor");
                continue;
            }
            let table = next_sibling(anchor, "table")?
                .ok_or_else(|| ExtractError::Missing(format!("table after section anchor '{}'", section)))?;
            let rows = select(table, "tr")?;

            let RoleMatch::Role(tag) = matched else {
                debug!(section, people = rows.len(), "skipping excluded section");
                page.tally.excluded += rows.len() as u64;
                continue;
            };

            for row in rows {
                let cells = expect_cells(row, "td", COLUMNS)?;
                let name = last_first(&text(cells[0]))?;
                let email = match select_optional(cells[2], "script")? {
                    Some(script) => HIDE_EMAIL.decode(&script.text().collect::<String>())?,
                    None => None,
                };
                page.push(&name, tag, email)?;
            }
        }
        Ok(page)
    }
}
