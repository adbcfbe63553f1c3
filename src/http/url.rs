//! URL merging.
//!
//! # Responsibilities
//! - Split a call-site URL into scheme, authority, path, query, fragment
//! - Combine it with the base server, component by component
//!
//! # Design Decisions
//! - Override wins when its component is non-empty, base otherwise
//! - No relative-reference resolution: `x` against `/b/c` gives `/x`, not `/b/x`
//! - The merged string is re-parsed so the result is always a valid `Url`

use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::pool::Server;

/// Raw components of a URL reference, borrowed from the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub scheme: &'a str,
    pub authority: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

impl<'a> UrlParts<'a> {
    /// Split a URL reference (absolute or relative) into components.
    pub fn split(input: &'a str) -> Self {
        let (rest, fragment) = input.split_once('#').unwrap_or((input, ""));
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));

        let (scheme, rest) = match rest.find(':') {
            Some(idx) if is_scheme(&rest[..idx]) => (&rest[..idx], &rest[idx + 1..]),
            _ => ("", rest),
        };

        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => match after.find('/') {
                Some(idx) => (&after[..idx], &after[idx..]),
                None => (after, ""),
            },
            None => ("", rest),
        };

        Self {
            scheme,
            authority,
            path,
            query,
            fragment,
        }
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn pick<'a>(over: &'a str, base: &'a str) -> &'a str {
    if over.is_empty() {
        base
    } else {
        over
    }
}

/// Merge a call-site URL into the base server.
pub fn merge(base: &Server, reference: &str) -> ClientResult<Url> {
    let over = UrlParts::split(reference.trim());
    let base_authority = base.authority();

    let scheme = pick(over.scheme, base.scheme());
    let authority = pick(over.authority, &base_authority);
    let path = pick(over.path, base.path());
    let query = pick(over.query, base.query().unwrap_or_default());
    let fragment = pick(over.fragment, base.fragment().unwrap_or_default());

    let mut merged = format!("{scheme}://{authority}");
    if !path.starts_with('/') {
        merged.push('/');
    }
    merged.push_str(path);
    if !query.is_empty() {
        merged.push('?');
        merged.push_str(query);
    }
    if !fragment.is_empty() {
        merged.push('#');
        merged.push_str(fragment);
    }

    Url::parse(&merged).map_err(|e| {
        ClientError::Configuration(format!(
            "Cannot merge {reference:?} into {base}: {e}"
        ))
    })
}
