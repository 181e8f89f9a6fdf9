//! UC San Diego, Computer Science and Engineering.
//!
//! `dir` is the school-wide directory query; only its
//! "Researchers/Post-Docs/Visitors" section is read. `phd` pages are yearly
//! lists of graduating students written as free text, which
//! [`scan_listing`] splits into entries.

use scraper::{ElementRef, Html};

use super::{Adapter, Categories, ExtractError, PageContext, PageExtraction};
use crate::email::{deobfuscate_words, is_plausible, MAILTO_PREFIX};
use crate::html::{attr, cell_texts, expect_cells, expect_header, select, select_exact, stripped_strings, text};
use crate::name::{last_first, normalize_ws};
use crate::record::RoleTag;

const DIR_TABLE: &str = "table.searchTbl";
const DIR_HEADER: [&str; 6] = ["Name", "Title", "Location", "Phone", "Email", "Mail"];
const SECTION_BGCOLOR: &str = "#FFFF99";
const DIR_SECTION: &str = "Researchers/Post-Docs/Visitors";

const PHD_CONTENT_BLOCKS: usize = 7;
const PHD_LISTING_BLOCK: usize = 2;

const EMAIL_LABEL: &str = "Email:";
/// Obfuscated addresses shorter than this were wrapped onto the next line.
const MIN_ADDRESS_LEN: usize = 12;
const MAX_NAME_TOKENS: usize = 5;
const BYTE_ORDER_MARK: char = '\u{feff}';

pub struct Ucsd;

impl Adapter for Ucsd {
    fn id(&self) -> &'static str {
        "ucsd"
    }

    fn categories(&self) -> Categories {
        Categories::Named(&["dir", "phd"])
    }

    fn parse(&self, ctx: &PageContext<'_>, document: &str) -> Result<PageExtraction, ExtractError> {
        let doc = Html::parse_document(document);
        let root = doc.root_element();
        match ctx.category {
            "dir" => parse_dir(root),
            "phd" => parse_phd(root),
            _ => Err(ctx.unknown_category()),
        }
    }
}

fn is_section_row(row: ElementRef<'_>) -> bool {
    row.value()
        .attr("bgcolor")
        .is_some_and(|color| color.trim().eq_ignore_ascii_case(SECTION_BGCOLOR))
}

fn parse_dir(root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let mut page = PageExtraction::new();

    // The first searchTbl is the search form.
    let table = select_exact(root, DIR_TABLE, 2)?[1];
    let rows = select(table, "tr")?;
    let header = rows
        .first()
        .ok_or_else(|| ExtractError::Missing(format!("header row of {}", DIR_TABLE)))?;
    expect_header(DIR_TABLE, &cell_texts(*header, "th")?, &DIR_HEADER)?;

    let start = rows
        .iter()
        .position(|row| is_section_row(*row) && text(*row) == DIR_SECTION)
        .ok_or_else(|| ExtractError::Missing(format!("section '{}'", DIR_SECTION)))?
        + 1;
    let end = rows[start..]
        .iter()
        .position(|row| is_section_row(*row))
        .map(|offset| start + offset)
        .ok_or_else(|| ExtractError::Missing(format!("end of section '{}'", DIR_SECTION)))?;

    for row in &rows[start..end] {
        let cells = expect_cells(*row, "td", DIR_HEADER.len())?;
        let name = last_first(&text(cells[0]))?;
        let shown = text(cells[4]);
        let links = select(cells[4], "a")?;
        // Entries listing several addresses have no single answer.
        let email = match links.as_slice() {
            [link] => {
                let href = attr(*link, "href")?.trim();
                if href != format!("{}{}", MAILTO_PREFIX, shown) {
                    return Err(ExtractError::Malformed {
                        what: "email link".into(),
                        detail: format!("expected {}{}, found {:?}", MAILTO_PREFIX, shown, href),
                    });
                }
                Some(shown)
            }
            _ => None,
        };
        page.push(&name, RoleTag::Staff, email)?;
    }
    Ok(page)
}

fn parse_phd(root: ElementRef<'_>) -> Result<PageExtraction, ExtractError> {
    let blocks = select_exact(root, "div.content", PHD_CONTENT_BLOCKS)?;
    let lines = stripped_strings(blocks[PHD_LISTING_BLOCK]);

    let mut page = PageExtraction::new();
    for entry in scan_listing(&lines)? {
        page.push(&entry.name, RoleTag::Phd, entry.email)?;
    }
    Ok(page)
}

/// One person recovered from a free-text listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub email: Option<String>,
}

fn ran_out(context: &str) -> ExtractError {
    ExtractError::Malformed {
        what: "graduate listing".into(),
        detail: format!("text ends {}", context),
    }
}

/// Splits a free-text listing into entries.
///
/// An entry starts with a name line (or two lines, when the first holds a
/// single word) and ends at its email line. Lines in between (thesis titles,
/// advisors) are skipped. An entry with no email line before the end of the
/// text has no email.
pub fn scan_listing(raw_lines: &[String]) -> Result<Vec<ListingEntry>, ExtractError> {
    let lines: Vec<String> = raw_lines
        .iter()
        .map(|line| normalize_ws(line.trim_start_matches(BYTE_ORDER_MARK)))
        .filter(|line| !line.is_empty())
        .collect();

    let mut entries = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let first = &lines[index];
        let tokens = first.split(' ').count();
        let name = if tokens < 2 {
            index += 1;
            let last = lines.get(index).ok_or_else(|| ran_out("inside a name"))?;
            if last.split(' ').count() != 1 {
                return Err(ExtractError::Malformed {
                    what: "name".into(),
                    detail: format!("{:?} followed by {:?}", first, last),
                });
            }
            format!("{} {}", first, last)
        } else if tokens > MAX_NAME_TOKENS {
            return Err(ExtractError::Malformed {
                what: "name".into(),
                detail: format!("{:?} has {} words", first, tokens),
            });
        } else {
            first.clone()
        };

        index += 1;
        let mut email = None;
        while index < lines.len() {
            let line = &lines[index];

            if let Some(at) = line.find('@') {
                if is_plausible(&format!("x{}", &line[at..])) {
                    let address = line.strip_prefix(EMAIL_LABEL).map(str::trim).unwrap_or(line.as_str());
                    if is_plausible(address) {
                        email = Some(address.to_string());
                    }
                    break;
                }
            }

            let labelled = if line == EMAIL_LABEL {
                index += 1;
                Some(lines.get(index).ok_or_else(|| ran_out("after an Email: label"))?.clone())
            } else {
                line.strip_prefix(EMAIL_LABEL).map(|rest| rest.trim().to_string())
            };
            if let Some(mut raw) = labelled {
                if raw.chars().count() < MIN_ADDRESS_LEN {
                    index += 1;
                    let next = lines.get(index).ok_or_else(|| ran_out("inside an address"))?;
                    raw = format!("{} {}", raw, next);
                }
                email = deobfuscate_words(&raw);
                break;
            }
            index += 1;
        }

        entries.push(ListingEntry { name, email });
        index += 1;
    }
    Ok(entries)
}
