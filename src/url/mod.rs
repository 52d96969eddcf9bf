//! URL handling module for Endpoint-Ripple
//!
//! This module provides seed validation, visited-set keys, and the network
//! location comparison used to keep the crawl on the seed's site.

mod domain;
mod normalize;

pub use domain::{network_location, same_origin};
pub use normalize::{parse_seed_url, visit_key};

use url::Url;

/// Resolves an `href`/`src` attribute value against a page URL
///
/// Returns None if the reference should be ignored:
/// - empty values and fragment-only anchors (`#section`)
/// - `javascript:`, `mailto:`, `tel:` and `data:` pseudo-URLs
/// - values that fail to join
/// - anything that is not HTTP(S) after resolution
///
/// # Examples
///
/// ```
/// use url::Url;
/// use endpoint_ripple::url::resolve_reference;
///
/// let base = Url::parse("https://site.test/docs/").unwrap();
/// let resolved = resolve_reference("intro", &base).unwrap();
/// assert_eq!(resolved.as_str(), "https://site.test/docs/intro");
/// assert!(resolve_reference("mailto:a@site.test", &base).is_none());
/// ```
pub fn resolve_reference(reference: &str, base_url: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lowered = reference.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(reference) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}
