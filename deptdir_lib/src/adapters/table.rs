//! Generic adapter for plain directory tables.
//!
//! Everything site-specific comes from the site's `[site.table]` layout: the
//! table selector, the expected header, which columns hold the name, role
//! label and email, and how names are ordered. Without a role column the page
//! category must be a role tag, which every row receives.

use scraper::{ElementRef, Html};

use super::{
    check_categories, require_role_tables, Adapter, Categories, ExtractError, PageContext, PageExtraction,
};
use crate::config::{NameOrder, SiteConfig, TableLayout};
use crate::email::{from_mailto, with_implicit_domain};
use crate::html::{self, attr, cell_texts, expect_cells, expect_header, select, select_one, text};
use crate::name::{last_first, normalize_ws, reorder_name};

pub struct Table;

fn layout<'a>(site: &'a SiteConfig) -> Result<&'a TableLayout, ExtractError> {
    site.table
        .as_ref()
        .ok_or_else(|| ExtractError::Config("[site.table] layout".into()))
}

impl Adapter for Table {
    fn id(&self) -> &'static str {
        "table"
    }

    fn categories(&self) -> Categories {
        Categories::RoleTags
    }

    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        let layout = layout(site)?;
        html::selector(&layout.selector)?;
        html::selector(&layout.header_cell)?;

        let columns = layout.header.len();
        let mut used = vec![("name_column", layout.name_column)];
        used.extend(layout.role_column.map(|c| ("role_column", c)));
        used.extend(layout.email_column.map(|c| ("email_column", c)));
        for (field, column) in used {
            if column >= columns {
                return Err(ExtractError::Config(format!(
                    "{} {} within a {}-column header",
                    field, column, columns
                )));
            }
        }

        match (layout.role_column, layout.role_table.as_deref()) {
            (Some(_), Some(table)) => require_role_tables(site, &[table]),
            (None, None) => check_categories(self.id(), self.categories(), site),
            (Some(_), None) => Err(ExtractError::Config("role_table for role_column".into())),
            (None, Some(_)) => Err(ExtractError::Config("role_column for role_table".into())),
        }
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let layout = layout(ctx.site)?;
        let role_lookup = match (layout.role_column, layout.role_table.as_deref()) {
            (Some(column), Some(name)) => Some((column, ctx.role_table(name)?)),
            _ => None,
        };
        let page_role = match role_lookup {
            Some(_) => None,
            None => Some(ctx.category_role()?),
        };

        let doc = Html::parse_document(document);
        let mut page = PageExtraction::new();

        let table = select_one(doc.root_element(), &layout.selector)?;
        let rows = select(table, "tr")?;
        let header = rows
            .first()
            .ok_or_else(|| ExtractError::Missing(format!("header row of `{}`", layout.selector)))?;
        let expected: Vec<&str> = layout.header.iter().map(String::as_str).collect();
        expect_header(
            &format!("table `{}`", layout.selector),
            &cell_texts(*header, &layout.header_cell)?,
            &expected,
        )?;

        for row in &rows[1..] {
            let cells = expect_cells(*row, "td", expected.len())?;
            let tag = match (page_role, role_lookup) {
                (Some(tag), _) => tag,
                (None, Some((column, roles))) => match page.classify(roles, &text(cells[column])) {
                    Some(tag) => tag,
                    None => continue,
                },
                (None, None) => return Err(ctx.unknown_category()),
            };
            let name = ordered_name(&text(cells[layout.name_column]), layout.name_order)?;
            let email = match layout.email_column {
                Some(column) => cell_email(cells[column], ctx.site.email_domain.as_deref())?,
                None => None,
            };
            page.push(&name, tag, email)?;
        }
        Ok(page)
    }
}

fn ordered_name(raw: &str, order: NameOrder) -> Result<String, ExtractError> {
    match order {
        NameOrder::AsIs => Ok(normalize_ws(raw)),
        NameOrder::Reorder => Ok(reorder_name(raw)),
        NameOrder::LastFirst => last_first(raw),
    }
}

/// Address from a mailto link in the cell, else from its text.
fn cell_email(cell: ElementRef<'_>, domain: Option<&str>) -> Result<Option<String>, ExtractError> {
    for anchor in select(cell, "a[href]")? {
        if let Some(address) = from_mailto(attr(anchor, "href")?) {
            return Ok(Some(address));
        }
    }
    let shown = text(cell);
    Ok(match domain {
        Some(domain) => with_implicit_domain(&shown, domain),
        None => Some(shown).filter(|s| !s.is_empty()),
    })
}
