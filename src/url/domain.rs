use url::Url;

/// Returns the network location (lowercase host plus any explicit port) of a URL
///
/// The scheme plays no part, so `http://site.test` and `https://site.test`
/// share a network location while `http://127.0.0.1:8080` and
/// `http://127.0.0.1:9090` do not. A port equal to the scheme's default is
/// dropped by the URL parser and therefore never appears.
///
/// # Returns
///
/// * `Some(String)` - `host` or `host:port`
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use endpoint_ripple::url::network_location;
///
/// let url = Url::parse("https://Site.Test/path").unwrap();
/// assert_eq!(network_location(&url), Some("site.test".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(network_location(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true if both URLs share the same network location
///
/// URLs without a host are never considered same-origin, not even with each
/// other.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    match (network_location(a), network_location(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
