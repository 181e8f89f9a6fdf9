//! Caltech, Computing + Mathematical Sciences.
//!
//! Every entry links to the campus directory with the user id in the query
//! string; the address is that id at the site's email domain.

use scraper::{ElementRef, Html};

use super::{
    check_categories, require_email_domain, require_role_tables, Adapter, Categories, ExtractError,
    PageContext, PageExtraction,
};
use crate::config::SiteConfig;
use crate::email::with_implicit_domain;
use crate::html::{attr, expect_cells, select, select_exact, select_one, text};
use crate::name::{last_first, require_name};
use crate::record::RoleTag;

const HOME_PREFIX: &str = "http://directory.caltech.edu/cgi-bin/search.cgi?uid=";

/// Name, position, office, extension, email icon.
const DIR_COLUMNS: usize = 5;

pub struct Caltech;

impl Adapter for Caltech {
    fn id(&self) -> &'static str {
        "caltech"
    }

    fn categories(&self) -> Categories {
        Categories::Named(&["grad", "postdoc", "dir"])
    }

    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        check_categories(self.id(), self.categories(), site)?;
        require_role_tables(site, &["position"])?;
        require_email_domain(site)
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let doc = Html::parse_document(document);
        let root = doc.root_element();
        match ctx.category {
            "grad" => parse_grad(ctx, root),
            "postdoc" => parse_postdoc(ctx, root),
            "dir" => parse_dir(ctx, root),
            _ => Err(ctx.unknown_category()),
        }
    }
}

fn directory_email(anchor: ElementRef<'_>, domain: &str) -> Result<Option<String>, ExtractError> {
    let href = attr(anchor, "href")?.trim();
    let user = href.strip_prefix(HOME_PREFIX).ok_or_else(|| ExtractError::Malformed {
        what: "directory link".into(),
        detail: format!("expected {}<user>, found {:?}", HOME_PREFIX, href),
    })?;
    Ok(with_implicit_domain(user, domain))
}

fn parse_grad(ctx: &PageContext<'_>, root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let domain = ctx.email_domain()?;
    let mut page = PageExtraction::new();

    let list = select_one(root, "div.dynamic-2col.no-height")?;
    for item in select(list, "li")? {
        let name = require_name(&text(item), "graduate list item")?;
        let anchor = select_exact(item, "a", 1)?[0];
        page.push(&name, RoleTag::Grad, directory_email(anchor, domain)?)?;
    }
    Ok(page)
}

fn parse_postdoc(ctx: &PageContext<'_>, root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let domain = ctx.email_domain()?;
    let mut page = PageExtraction::new();

    let list = select_one(root, "ul.no-list-style")?;
    for item in select(list, "li")? {
        let anchor = select_exact(item, "a", 1)?[0];
        let name = require_name(&text(anchor), "postdoc link")?;
        page.push(&name, RoleTag::Postdoc, directory_email(anchor, domain)?)?;
    }
    Ok(page)
}

fn parse_dir(ctx: &PageContext<'_>, root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let positions = ctx.role_table("position")?;
    let domain = ctx.email_domain()?;
    let mut page = PageExtraction::new();

    let table = select_one(root, "table.table1")?;
    let rows = select(table, "tr")?;
    let header = rows
        .first()
        .ok_or_else(|| ExtractError::Missing("header row of table.table1".into()))?;
    select_exact(*header, "th", DIR_COLUMNS)?;

    for row in &rows[1..] {
        let cells = expect_cells(*row, "td", DIR_COLUMNS)?;
        let Some(tag) = page.classify(positions, &text(cells[1])) else {
            continue;
        };
        let name = last_first(&text(cells[0]))?;
        let anchor = select_exact(cells[0], "a", 1)?[0];
        page.push(&name, tag, directory_email(anchor, domain)?)?;
    }
    Ok(page)
}
