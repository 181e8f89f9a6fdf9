//! UMass Amherst, College of Information and Computer Sciences.

use scraper::{ElementRef, Html};

use super::{check_categories, require_email_domain, Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::config::SiteConfig;
use crate::email::{from_mailto, with_implicit_domain, MAILTO_PREFIX};
use crate::html::{attr, cell_texts, expect_cells, expect_header, select, select_one, text};
use crate::name::reorder_name;
use crate::record::RoleTag;

// The grad table marks every cell, including data cells, as a header cell.
const GRAD_HEADER: [&str; 3] = ["Name", "Phone", "E-Mail (@cs.umass.edu)"];
const PERSON_PANEL: &str = "div.group-person-info-panel";

pub struct Umass;

impl Adapter for Umass {
    fn id(&self) -> &'static str {
        "umass"
    }

    fn categories(&self) -> Categories {
        Categories::Named(&["grad", "phd", "master"])
    }

    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        check_categories(self.id(), self.categories(), site)?;
        require_email_domain(site)
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let doc = Html::parse_document(document);
        let root = doc.root_element();
        match ctx.category {
            "grad" => parse_grad(ctx, root),
            "phd" => parse_graduating(root, RoleTag::Phd),
            "master" => parse_graduating(root, RoleTag::Master),
            _ => Err(ctx.unknown_category()),
        }
    }
}

fn parse_grad(ctx: &PageContext<'_>, root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let domain = ctx.email_domain()?;
    let mut page = PageExtraction::new();

    let table = select_one(root, "table")?;
    let rows = select(table, "tr")?;
    let header = rows
        .first()
        .ok_or_else(|| ExtractError::Missing("header row".into()))?;
    expect_header("graduate table", &cell_texts(*header, "th")?, &GRAD_HEADER)?;

    for row in &rows[1..] {
        let cells = expect_cells(*row, "th", GRAD_HEADER.len())?;
        let name = reorder_name(&text(cells[0]));
        let email = with_implicit_domain(&text(cells[2]), domain);
        page.push(&name, RoleTag::Grad, email)?;
    }
    Ok(page)
}

/// Graduating students: one info panel per person.
fn parse_graduating(root: ElementRef<'_>, tag: RoleTag) -> Result<PageExtraction, ExtractError> {
    let mut page = PageExtraction::new();

    for panel in select(root, PERSON_PANEL)? {
        let name = reorder_name(&text(select_one(panel, "h2")?));

        let mut mailto = None;
        for anchor in select(panel, "a[href]")? {
            let href = attr(anchor, "href")?;
            if !href.trim().starts_with(MAILTO_PREFIX) {
                continue;
            }
            if mailto.is_some() {
                return Err(ExtractError::AnchorCount {
                    anchor: format!("mailto links for {}", name),
                    expected: 1,
                    found: 2,
                });
            }
            mailto = Some(href);
        }
        page.push(&name, tag, mailto.and_then(from_mailto))?;
    }
    Ok(page)
}
