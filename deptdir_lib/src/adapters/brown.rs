//! Brown University, Computer Science.
//!
//! Three page kinds: the graduate listing (sections of profile cards), the
//! undergraduate listing (one compact profile list) and the department
//! directory table. Email addresses are never printed; they are derived from
//! the user name in profile links or in the directory's email column.

use scraper::{ElementRef, Html};

use super::{
    check_categories, require_email_domain, require_role_tables, Adapter, Categories, ExtractError,
    PageContext, PageExtraction,
};
use crate::config::SiteConfig;
use crate::email::with_implicit_domain;
use crate::html::{attr, cell_texts, expect_cells, expect_header, next_sibling, select, select_one, text};
use crate::name::{last_first, require_name};
use crate::record::RoleTag;
use crate::roles::RoleMatch;

const GRAD_LINK_PREFIX: &str = "/people/grad/";
const UNDERGRAD_LINK_PREFIX: &str = "/people/ugrad/";
const PROFILE_LINK_SUFFIX: &str = "/";

const DIR_HEADER: [&str; 6] = ["Name", "Office", "Phone", "Status", "Email", "Assistant"];

pub struct Brown;

impl Adapter for Brown {
    fn id(&self) -> &'static str {
        "brown"
    }

    fn categories(&self) -> Categories {
        Categories::Named(&["grad", "undergrad", "dir"])
    }

    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        check_categories(self.id(), self.categories(), site)?;
        require_role_tables(site, &["section", "status"])?;
        require_email_domain(site)
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let doc = Html::parse_document(document);
        let root = doc.root_element();
        match ctx.category {
            "grad" => parse_grad(ctx, root),
            "undergrad" => parse_undergrad(ctx, root),
            "dir" => parse_dir(ctx, root),
            _ => Err(ctx.unknown_category()),
        }
    }
}

/// Title line every card of a graduate section must carry.
fn grad_title_text(tag: RoleTag) -> Option<&'static str> {
    match tag {
        RoleTag::Phd => Some("Doctoral Student"),
        RoleTag::Master => Some("Masters Student"),
        _ => None,
    }
}

fn parse_grad(ctx: &PageContext<'_>, root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let sections = ctx.role_table("section")?;
    let domain = ctx.email_domain()?;
    let mut page = PageExtraction::new();

    for heading in select(root, "h2[id]")? {
        let id = attr(heading, "id")?;
        let tag = match sections.classify(id) {
            RoleMatch::Role(tag) => tag,
            RoleMatch::Excluded => continue,
            RoleMatch::Unrecognized => {
                return Err(ExtractError::Malformed {
                    what: "graduate section".into(),
                    detail: format!("unknown section id '{}'", id),
                })
            }
        };
        let expected_title = grad_title_text(tag).ok_or_else(|| ExtractError::Malformed {
            what: "graduate section".into(),
            detail: format!("section '{}' maps to {}, which has no profile title", id, tag),
        })?;
        let list = next_sibling(heading, "ul.profile-list")?
            .ok_or_else(|| ExtractError::Missing(format!("ul.profile-list after section '{}'", id)))?;

        for card in select(list, "ul")? {
            let name = require_name(&text(select_one(card, "li.profile-name")?), "profile-name")?;
            let title = text(select_one(card, "li.profile-title")?);
            if title != expected_title {
                return Err(ExtractError::Malformed {
                    what: "profile title".into(),
                    detail: format!("expected {:?} for {}, found {:?}", expected_title, name, title),
                });
            }
            let link = select_one(card, "li.profile-link")?;
            let user = profile_user(link, GRAD_LINK_PREFIX)?;
            page.push(&name, tag, with_implicit_domain(&user, domain))?;
        }
    }
    Ok(page)
}

fn parse_undergrad(ctx: &PageContext<'_>, root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let domain = ctx.email_domain()?;
    let mut page = PageExtraction::new();

    let list = select_one(root, "ul.profile-list.profile-compact")?;
    for card in select(list, "ul")? {
        let name = require_name(&text(select_one(card, "li.profile-name")?), "profile-name")?;
        let link = select_one(card, "li.profile-link")?;
        let user = profile_user(link, UNDERGRAD_LINK_PREFIX)?;
        page.push(&name, RoleTag::Undergrad, with_implicit_domain(&user, domain))?;
    }
    Ok(page)
}

/// User name from the single profile link under `prefix`, e.g. `/people/grad/jdoe/`.
fn profile_user(links: ElementRef<'_>, prefix: &str) -> Result<String, ExtractError> {
    let mut user = None;
    for anchor in select(links, "a[href]")? {
        let href = attr(anchor, "href")?.trim();
        let Some(rest) = href.strip_prefix(prefix) else {
            continue;
        };
        let name = rest.strip_suffix(PROFILE_LINK_SUFFIX).ok_or_else(|| ExtractError::Malformed {
            what: "profile link".into(),
            detail: format!("{:?} does not end with {:?}", href, PROFILE_LINK_SUFFIX),
        })?;
        if user.is_some() {
            return Err(ExtractError::Malformed {
                what: "profile link".into(),
                detail: format!("more than one link under {}", prefix),
            });
        }
        user = Some(name.to_string());
    }
    user.filter(|u| !u.is_empty())
        .ok_or_else(|| ExtractError::Missing(format!("profile link under {}", prefix)))
}

fn parse_dir(ctx: &PageContext<'_>, root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let statuses = ctx.role_table("status")?;
    let domain = ctx.email_domain()?;
    let mut page = PageExtraction::new();

    let table = select_one(root, "table#deptdir")?;
    let rows = select(table, "tr")?;
    let header = rows
        .first()
        .ok_or_else(|| ExtractError::Missing("header row of table#deptdir".into()))?;
    expect_header("table#deptdir", &cell_texts(*header, "th")?, &DIR_HEADER)?;

    for row in &rows[1..] {
        let cells = expect_cells(*row, "td", DIR_HEADER.len())?;
        let Some(tag) = page.classify(statuses, &text(cells[3])) else {
            continue;
        };
        let name = last_first(&text(cells[0]))?;
        let email = with_implicit_domain(&text(cells[4]), domain);
        page.push(&name, tag, email)?;
    }
    Ok(page)
}
