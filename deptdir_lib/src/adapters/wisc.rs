//! University of Wisconsin-Madison, Computer Sciences.

use scraper::Html;

use super::{Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::email::MAILTO_PREFIX;
use crate::html::{attr, select, select_one, select_optional, text};
use crate::name::{reorder_name, require_name};

const ROW: &str = "li.views-row";
const NAME_FIELD: &str = "div.views-field-field-full-name";
const EMAIL_FIELD: &str = "div.views-field-views-conditional";

pub struct Wisc;

impl Adapter for Wisc {
    fn id(&self) -> &'static str {
        "wisc"
    }

    fn categories(&self) -> Categories {
        Categories::RoleTags
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let tag = ctx.category_role()?;
        let doc = Html::parse_document(document);
        let mut page = PageExtraction::new();

        for item in select(doc.root_element(), ROW)? {
            let name = require_name(&text(select_one(item, NAME_FIELD)?), NAME_FIELD)?;
            let field = select_one(item, EMAIL_FIELD)?;

            let email = match select_optional(field, "a")? {
                Some(anchor) => {
                    let shown = text(anchor);
                    let href = attr(anchor, "href")?.trim();
                    if href != format!("{}{}", MAILTO_PREFIX, shown) {
                        return Err(ExtractError::Malformed {
                            what: "email link".into(),
                            detail: format!("{:?} links to {:?}", shown, href),
                        });
                    }
                    Some(shown).filter(|e| !e.is_empty())
                }
                None => None,
            };
            page.push(&reorder_name(&name), tag, email)?;
        }
        Ok(page)
    }
}
