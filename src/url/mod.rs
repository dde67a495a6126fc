//! URL handling module for Wavecrawl
//!
//! This module provides host extraction, registrable-domain computation and the scope
//! filter that decides which discovered URLs the crawl may follow.
//!
//! URL identity throughout the crate is the serialized form produced by `url::Url`
//! when a link is resolved against its page. No further canonicalization is applied:
//! fragments and trailing slashes are significant.

mod domain;
mod scope;

// Re-export main functions
pub use domain::{extract_host, registrable_domain};
pub use scope::{in_scope, should_skip_url, ScopeFilter};

use crate::{UrlError, UrlResult};
use url::Url;

/// Builds the robots.txt URL for the host of `url`
///
/// The scheme, host and port are kept; the path is replaced by `/robots.txt`.
///
/// # Examples
///
/// ```
/// use wavecrawl::url::robots_url_for;
///
/// let robots = robots_url_for("https://en.wikipedia.org/wiki/Rust?x=1").unwrap();
/// assert_eq!(robots.as_str(), "https://en.wikipedia.org/robots.txt");
/// ```
pub fn robots_url_for(url: &str) -> UrlResult<Url> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }
    parsed
        .join("/robots.txt")
        .map_err(|e| UrlError::Parse(e.to_string()))
}

/// Serializes `url` the way resolved links are serialized
///
/// The seed goes through this before it enters the frontier, so `https://example.com`
/// and a link back to `https://example.com/` are the same URL.
///
/// # Examples
///
/// ```
/// use wavecrawl::url::canonical_url;
///
/// assert_eq!(canonical_url("HTTPS://Example.com").unwrap(), "https://example.com/");
/// ```
pub fn canonical_url(url: &str) -> UrlResult<String> {
    Url::parse(url)
        .map(String::from)
        .map_err(|e| UrlError::Parse(e.to_string()))
}

/// Returns the cache key identifying a site for robots.txt purposes
///
/// Scheme, host and port together identify the site, since each combination serves
/// its own robots.txt.
pub fn site_key(url: &Url) -> Option<String> {
    let host = extract_host(url)?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
