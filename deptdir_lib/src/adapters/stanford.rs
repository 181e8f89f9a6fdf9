//! Stanford University, Computer Science.
//!
//! Each role has its own paginated listing: a single four-column table whose
//! last column holds a bare user name or a full address.

use scraper::Html;

use super::{check_categories, require_email_domain, Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::config::SiteConfig;
use crate::email::with_implicit_domain;
use crate::html::{expect_cells, select, select_exact, select_one, text};
use crate::name::reorder_name;

const COLUMNS: usize = 4;
const NAME_COLUMN: usize = 0;
const EMAIL_COLUMN: usize = 3;

pub struct Stanford;

impl Adapter for Stanford {
    fn id(&self) -> &'static str {
        "stanford"
    }

    fn categories(&self) -> Categories {
        Categories::RoleTags
    }

    fn validate(&self, site: &SiteConfig) -> Result<(), ExtractError> {
        check_categories(self.id(), self.categories(), site)?;
        require_email_domain(site)
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let tag = ctx.category_role()?;
        let domain = ctx.email_domain()?;
        let doc = Html::parse_document(document);
        let mut page = PageExtraction::new();

        let table = select_one(doc.root_element(), "table")?;
        let rows = select(table, "tr")?;
        let header = rows
            .first()
            .ok_or_else(|| ExtractError::Missing("header row".into()))?;
        select_exact(*header, "th", COLUMNS)?;

        for row in &rows[1..] {
            let cells = expect_cells(*row, "td", COLUMNS)?;
            let name = reorder_name(&text(cells[NAME_COLUMN]));
            let email = with_implicit_domain(&text(cells[EMAIL_COLUMN]), domain);
            page.push(&name, tag, email)?;
        }
        Ok(page)
    }
}
