//! Email recovery from the various ways directory pages hide addresses.

use std::sync::LazyLock;

use regex::Regex;

use crate::adapters::ExtractError;

pub const MAILTO_PREFIX: &str = "mailto:";

static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.][^@\s]*\.[^@\s]*[^@\s.]$").expect("invalid regex: email")
});

/// Syntactic plausibility check: exactly one `@`, non-empty local part, a
/// dotted domain, no whitespace.
pub fn is_plausible(address: &str) -> bool {
    RE_EMAIL.is_match(address)
}

/// Address from a `mailto:` href: prefix stripped, percent-decoded, query dropped, trimmed.
///
/// Returns `None` for hrefs that are not mailto links or carry no address.
pub fn from_mailto(href: &str) -> Option<String> {
    let href = href.trim();
    let scheme = href.get(..MAILTO_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(MAILTO_PREFIX) {
        return None;
    }
    let rest = &href[MAILTO_PREFIX.len()..];
    let rest = rest.split('?').next().unwrap_or(rest);
    let decoded = urlencoding::decode(rest)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| rest.to_string());
    let address = decoded.trim();
    if address.is_empty() {
        None
    } else {
        Some(address.to_string())
    }
}

/// `user@domain` from separately rendered halves; `None` if either half is empty.
pub fn join_parts(user: &str, domain: &str) -> Option<String> {
    let user = user.trim();
    let domain = domain.trim();
    if user.is_empty() || domain.is_empty() {
        None
    } else {
        Some(format!("{}@{}", user, domain))
    }
}

/// Like [`join_parts`], for sources where the halves must appear together.
///
/// Both empty means no email; exactly one empty means the markup no longer
/// matches what the adapter expects.
pub fn require_pair(user: &str, domain: &str) -> Result<Option<String>, ExtractError> {
    match (user.trim().is_empty(), domain.trim().is_empty()) {
        (true, true) => Ok(None),
        (false, false) => Ok(join_parts(user, domain)),
        _ => Err(ExtractError::Malformed {
            what: "email user/domain pair".into(),
            detail: format!("user {:?} with domain {:?}", user.trim(), domain.trim()),
        }),
    }
}

/// Bare local part suffixed with a fixed site domain; full addresses pass through.
pub fn with_implicit_domain(local: &str, domain: &str) -> Option<String> {
    let local = local.trim();
    if local.is_empty() {
        None
    } else if local.contains('@') {
        Some(local.to_string())
    } else {
        Some(format!("{}@{}", local, domain.trim_start_matches('@')))
    }
}

/// Reverses "jdoe at example dot edu" style obfuscation.
///
/// Whitespace-separated tokens `at` and `dot` become `@` and `.`, everything
/// is concatenated, and the result is kept only if it is plausible.
pub fn deobfuscate_words(raw: &str) -> Option<String> {
    let joined: String = raw
        .split_whitespace()
        .map(|token| match token {
            "at" => "@",
            "dot" => ".",
            other => other,
        })
        .collect();
    if is_plausible(&joined) {
        Some(joined)
    } else {
        None
    }
}

/// Anti-scraper script call with literal string arguments, e.g.
/// `hideemail('x', 'jdoe', 'example.edu', 1, 0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEmail {
    /// Text the script must start with, including the opening parenthesis.
    pub prefix: &'static str,
    /// Zero-based position of the user argument.
    pub user_arg: usize,
    /// Zero-based position of the domain argument.
    pub domain_arg: usize,
    /// Exact argument count the call must have, when known.
    pub arity: Option<usize>,
}

impl ScriptEmail {
    /// Decodes one script body. A wrong prefix or arity is structural; empty
    /// user or domain arguments mean no email.
    pub fn decode(&self, script: &str) -> Result<Option<String>, ExtractError> {
        let script = script.trim();
        let args = script.strip_prefix(self.prefix).ok_or_else(|| ExtractError::Malformed {
            what: "email script".into(),
            detail: format!("expected prefix {:?} in {:?}", self.prefix, script),
        })?;
        let args = args.trim_end().trim_end_matches(';').trim_end();
        let args = args.strip_suffix(')').unwrap_or(args);
        let parts: Vec<&str> = args.split(',').map(|p| p.trim_matches([' ', '\'', '"'])).collect();

        if let Some(arity) = self.arity {
            if parts.len() != arity {
                return Err(ExtractError::Malformed {
                    what: "email script".into(),
                    detail: format!("expected {} arguments, found {} in {:?}", arity, parts.len(), script),
                });
            }
        }
        let user = parts.get(self.user_arg).copied().unwrap_or("");
        let domain = parts.get(self.domain_arg).copied().unwrap_or("");
        Ok(join_parts(user, domain))
    }
}
