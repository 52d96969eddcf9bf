//! HTML parser for extracting navigable links and script sources
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from `<a href>` tags)
//! - External scripts to scan (from `<script src>` tags)

use crate::url::resolve_reference;
use scraper::{Html, Selector};
use url::Url;

/// Extracted references from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// All anchor targets found on the page (absolute URLs, document order)
    pub links: Vec<Url>,

    /// All external script sources (absolute URLs, document order)
    pub scripts: Vec<Url>,
}

/// Parses HTML content and extracts anchors and script sources
///
/// # Extraction Rules
///
/// **Links:** every `<a href="...">`, including `rel="nofollow"` and
/// `download` anchors. Domain filtering is left to the caller.
///
/// **Scripts:** every `<script src="...">`; inline scripts are scanned as part
/// of the page text instead.
///
/// **Skipped:** empty values, fragment-only anchors, `javascript:`, `mailto:`,
/// `tel:` and `data:` references, and anything that is not HTTP(S) once
/// resolved.
///
/// The document is parsed leniently; malformed markup yields whatever the
/// HTML5 parser recovers rather than an error.
///
/// # Example
///
/// ```
/// use endpoint_ripple::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a><script src="/app.js"></script></body></html>"#;
/// let base_url = Url::parse("https://site.test/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links[0].as_str(), "https://site.test/page");
/// assert_eq!(parsed.scripts[0].as_str(), "https://site.test/app.js");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: select_references(&document, "a[href]", "href", base_url),
        scripts: select_references(&document, "script[src]", "src", base_url),
    }
}

/// Resolves the given attribute of every element matching `selector`
fn select_references(document: &Html, selector: &str, attr: &str, base_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|value| resolve_reference(value, base_url))
        .collect()
}
