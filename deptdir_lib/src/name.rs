//! Person-name normalization.

use crate::adapters::ExtractError;

/// Collapses every whitespace run (including non-breaking spaces) to one space and trims.
pub fn normalize_ws(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reorders "Last, First" to "First Last"; names without a comma pass through.
///
/// Only the first comma separates the surname; any further commas are dropped,
/// so "Smith, John, Jr." becomes "John Jr. Smith". The output never contains a
/// comma, which makes the reordering idempotent.
pub fn reorder_name(raw: &str) -> String {
    let raw = normalize_ws(raw);
    match raw.split_once(',') {
        Some((last, first)) => normalize_ws(&format!("{} {}", first, last).replace(',', " ")),
        None => raw,
    }
}

/// Strict "Last, First" reordering for sources that always use that form.
///
/// Errors on empty names and on names without exactly one comma, since either
/// means the column no longer holds what the adapter expects.
pub fn last_first(raw: &str) -> Result<String, ExtractError> {
    let cleaned = normalize_ws(raw);
    if cleaned.is_empty() {
        return Err(ExtractError::EmptyName("name cell".into()));
    }
    let parts: Vec<&str> = cleaned.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [last, first] if !last.is_empty() && !first.is_empty() => {
            Ok(format!("{} {}", first, last))
        }
        _ => Err(ExtractError::Malformed {
            what: "name".into(),
            detail: format!("expected \"Last, First\", got {:?}", cleaned),
        }),
    }
}

/// Trims a name and rejects it if empty.
pub fn require_name(raw: &str, context: &str) -> Result<String, ExtractError> {
    let name = normalize_ws(raw);
    if name.is_empty() {
        Err(ExtractError::EmptyName(context.to_string()))
    } else {
        Ok(name)
    }
}
