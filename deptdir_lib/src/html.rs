//! Structural queries over parsed HTML with counted, loudly failing selection.

use scraper::{ElementRef, Selector};

use crate::adapters::ExtractError;
use crate::name::normalize_ws;

/// Compiles a CSS selector.
pub fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        css: css.to_string(),
        reason: e.to_string(),
    })
}

/// All descendants of `scope` matching `css`, in document order.
pub fn select<'a>(scope: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).collect())
}

/// Descendants matching `css`; errors unless there are exactly `expected` of them.
pub fn select_exact<'a>(
    scope: ElementRef<'a>,
    css: &str,
    expected: usize,
) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let found = select(scope, css)?;
    if found.len() != expected {
        return Err(ExtractError::AnchorCount {
            anchor: format!("`{}`", css),
            expected,
            found: found.len(),
        });
    }
    Ok(found)
}

/// The single descendant matching `css`.
pub fn select_one<'a>(scope: ElementRef<'a>, css: &str) -> Result<ElementRef<'a>, ExtractError> {
    let found = select_exact(scope, css, 1)?;
    Ok(found[0])
}

/// At most one descendant matching `css`.
pub fn select_optional<'a>(
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let found = select(scope, css)?;
    match found.len() {
        0 => Ok(None),
        1 => Ok(Some(found[0])),
        n => Err(ExtractError::AnchorCount {
            anchor: format!("`{}` (at most)", css),
            expected: 1,
            found: n,
        }),
    }
}

/// Text content with whitespace runs collapsed and ends trimmed.
pub fn text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// Every non-empty text node under `el`, trimmed, in document order.
pub fn stripped_strings(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A required attribute value.
pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Result<&'a str, ExtractError> {
    el.value()
        .attr(name)
        .ok_or_else(|| ExtractError::Missing(format!("attribute `{}` on <{}>", name, el.value().name())))
}

/// The first following sibling element matching `css`.
pub fn next_sibling<'a>(
    el: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let sel = selector(css)?;
    Ok(el
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sel.matches(sibling)))
}

/// Texts of the cells matching `cell_css` inside `row`.
pub fn cell_texts(row: ElementRef<'_>, cell_css: &str) -> Result<Vec<String>, ExtractError> {
    Ok(select(row, cell_css)?.into_iter().map(text).collect())
}

/// Asserts that a header row carries exactly the expected labels, in order.
pub fn expect_header(anchor: &str, found: &[String], expected: &[&str]) -> Result<(), ExtractError> {
    if found.iter().map(String::as_str).eq(expected.iter().copied()) {
        Ok(())
    } else {
        Err(ExtractError::HeaderMismatch {
            anchor: anchor.to_string(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: found.to_vec(),
        })
    }
}

/// Errors unless a row has exactly `expected` cells.
pub fn expect_cells<'a>(
    row: ElementRef<'a>,
    cell_css: &str,
    expected: usize,
) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let cells = select(row, cell_css)?;
    if cells.len() != expected {
        return Err(ExtractError::AnchorCount {
            anchor: format!("`{}` cells in row {:?}", cell_css, text(row)),
            expected,
            found: cells.len(),
        });
    }
    Ok(cells)
}
