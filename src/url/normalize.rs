use crate::UrlError;
use url::Url;

/// Parses and validates the seed URL supplied by the user
///
/// # Validation Steps
///
/// 1. Trim surrounding whitespace and parse; reject if malformed
/// 2. Only `http` and `https` schemes are accepted
/// 3. The URL must carry a host
///
/// The parsed URL is returned without any further rewriting, so the seed is
/// fetched exactly as given (apart from the URL library's own serialization).
///
/// # Examples
///
/// ```
/// use endpoint_ripple::url::parse_seed_url;
///
/// let url = parse_seed_url("https://site.test/start").unwrap();
/// assert_eq!(url.as_str(), "https://site.test/start");
///
/// assert!(parse_seed_url("ftp://site.test/").is_err());
/// ```
pub fn parse_seed_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Returns the key under which a page is recorded in the visited set
///
/// Fragments never reach the server, so `/page#a` and `/page#b` address the same
/// document and share one key. Everything else is kept verbatim.
pub fn visit_key(url: &Url) -> String {
    if url.fragment().is_none() {
        return url.as_str().to_string();
    }

    let mut url = url.clone();
    url.set_fragment(None);
    url.as_str().to_string()
}
