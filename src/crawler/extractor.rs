//! Endpoint extraction from raw HTML or JavaScript text
//!
//! A single pattern is run over the text. It matches either fully-qualified
//! `http(s)://` URLs or root-relative paths built from word characters and
//! `-./?=&`. Root-relative matches are joined onto the page URL; a match is
//! kept only when the matched text itself names a host and a path. Kept
//! endpoints are compared as exact strings.

use crate::state::EndpointSet;
use once_cell::sync::Lazy;
use regex::Regex;
use url::{Position, Url};

static ENDPOINT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s"'<>()]+|/[\w\-./?=&]+"#).expect("endpoint pattern compiles")
});

/// Extracts candidate endpoints from text
///
/// # Arguments
///
/// * `text` - HTML markup or JavaScript source
/// * `base_url` - URL used to resolve root-relative matches
///
/// # Returns
///
/// The set of absolute endpoint URLs. Matches that fail to parse, or that lack
/// a host or a path, are dropped silently.
///
/// # Example
///
/// ```
/// use endpoint_ripple::crawler::extract_endpoints;
/// use url::Url;
///
/// let base = Url::parse("https://site.test/").unwrap();
/// let found = extract_endpoints("fetch('/api/data?x=1')", &base);
/// assert!(found.contains("https://site.test/api/data?x=1"));
/// ```
pub fn extract_endpoints(text: &str, base_url: &Url) -> EndpointSet {
    ENDPOINT_PATTERN
        .find_iter(text)
        .filter_map(|m| resolve_match(m.as_str(), base_url))
        .collect()
}

/// Turns one pattern match into an absolute endpoint URL
///
/// Absolute matches are returned exactly as matched. Root-relative matches get
/// the page's `scheme://authority` prefixed, and scheme-relative ones only the
/// page's scheme, so neither is case-folded or percent-encoded. The URL parser
/// is only used to check that the result is valid and names a host.
///
/// Returns None when the match has no host or no path, or fails to parse.
pub fn resolve_match(candidate: &str, base_url: &Url) -> Option<String> {
    let resolved = if let Some(scheme_relative) = candidate.strip_prefix("//") {
        if !has_host_and_path(scheme_relative) {
            return None;
        }
        format!("{}:{}", base_url.scheme(), candidate)
    } else if candidate.starts_with('/') {
        join_root_relative(candidate, base_url)?
    } else {
        let (_, rest) = candidate.split_once("://")?;
        if !has_host_and_path(rest) {
            return None;
        }
        candidate.to_string()
    };

    match Url::parse(&resolved) {
        Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => Some(resolved),
        Ok(_) => {
            tracing::trace!("Dropping match without host: {}", resolved);
            None
        }
        Err(e) => {
            tracing::trace!("Dropping unparseable match {:?}: {}", candidate, e);
            None
        }
    }
}

/// Prefixes a root-relative path with the base's `scheme://authority`
///
/// Paths with `.` or `..` segments go through a full URL join so the segments
/// are resolved.
fn join_root_relative(path: &str, base_url: &Url) -> Option<String> {
    let path_only = path.split_once('?').map_or(path, |(p, _)| p);

    if path_only.split('/').any(|segment| segment == "." || segment == "..") {
        return match base_url.join(path) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                tracing::trace!("Dropping unjoinable match {:?}: {}", path, e);
                None
            }
        };
    }

    Some(format!("{}{}", &base_url[..Position::BeforePath], path))
}

/// Checks the text after `scheme://` for a non-empty authority followed by a path
///
/// The authority ends at the first `/`, `?` or `#`; only a `/` there starts a
/// path. `site.test` and `site.test?q=1` have no path, `site.test/` does.
fn has_host_and_path(after_scheme: &str) -> bool {
    let end = after_scheme
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(after_scheme.len());

    end > 0 && after_scheme[end..].starts_with('/')
}
