//! Host extraction and registrable-domain computation
//!
//! Scope is decided by comparing registrable domains, so `en.example.org` and
//! `www.example.org` belong to the same crawl.

use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased and stripped of a trailing root dot. The port is not part
/// of the host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wavecrawl::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.trim_end_matches('.').to_lowercase())
        .filter(|h| !h.is_empty())
}

/// Returns the registrable domain of a host: its last two labels
///
/// Hosts with fewer than two labels are returned unchanged. Multi-part public
/// suffixes such as `co.uk` are not recognised, so `a.example.co.uk` maps to `co.uk`.
///
/// # Examples
///
/// ```
/// use wavecrawl::url::registrable_domain;
///
/// assert_eq!(registrable_domain("en.wikipedia.org"), "wikipedia.org");
/// assert_eq!(registrable_domain("example.com"), "example.com");
/// assert_eq!(registrable_domain("localhost"), "localhost");
/// ```
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }
    labels[labels.len() - 2..].join(".")
}
