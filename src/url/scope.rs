//! Scope filtering for discovered URLs
//!
//! Every predicate here is pure: the same URL always yields the same answer, and
//! malformed URLs are simply out of scope.

use crate::config::ScopeConfig;
use crate::url::domain::{extract_host, registrable_domain};
use crate::{UrlError, UrlResult};
use url::Url;

/// Decides whether a URL belongs to the crawl
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    seed_domain: String,
    excluded_paths: Vec<String>,
    excluded_query_params: Vec<String>,
    skip_extensions: Vec<String>,
}

impl ScopeFilter {
    /// Creates a filter bound to the registrable domain of `seed`
    ///
    /// # Returns
    ///
    /// * `Ok(ScopeFilter)` - The seed is an http(s) URL with a host
    /// * `Err(UrlError)` - The seed cannot anchor a crawl
    pub fn for_seed(seed: &str, config: &ScopeConfig) -> UrlResult<Self> {
        let url = Url::parse(seed).map_err(|e| UrlError::Parse(e.to_string()))?;
        if !is_http(&url) {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }
        let host = extract_host(&url).ok_or(UrlError::MissingHost)?;
        Ok(Self::new(&registrable_domain(&host), config))
    }

    /// Creates a filter for an already computed registrable domain
    pub fn new(seed_domain: &str, config: &ScopeConfig) -> Self {
        Self {
            seed_domain: seed_domain.to_lowercase(),
            excluded_paths: config.excluded_paths.clone(),
            excluded_query_params: config.excluded_query_params.clone(),
            skip_extensions: config
                .skip_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        }
    }

    /// The registrable domain every in-scope URL must share
    pub fn seed_domain(&self) -> &str {
        &self.seed_domain
    }

    /// Returns true if the URL is http(s), in the seed's registrable domain, not
    /// excluded by path or query, and not a skippable resource type
    pub fn in_scope(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };

        if !is_http(&parsed) {
            return false;
        }

        let same_domain = extract_host(&parsed)
            .map(|host| registrable_domain(&host) == self.seed_domain)
            .unwrap_or(false);

        same_domain && !self.is_excluded(&parsed) && !self.has_skip_extension(&parsed)
    }

    /// Returns true if the URL points at a non-HTML resource type
    ///
    /// Malformed URLs are skipped.
    pub fn should_skip(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => self.has_skip_extension(&parsed),
            Err(_) => true,
        }
    }

    /// Returns true if the path contains an excluded substring or the query carries an
    /// excluded parameter
    fn is_excluded(&self, url: &Url) -> bool {
        let path = url.path();
        if self.excluded_paths.iter().any(|p| path.contains(p.as_str())) {
            return true;
        }

        match url.query() {
            Some(query) => query.split('&').any(|pair| {
                self.excluded_query_params
                    .iter()
                    .any(|prefix| pair.starts_with(prefix.as_str()))
            }),
            None => false,
        }
    }

    fn has_skip_extension(&self, url: &Url) -> bool {
        let path = url.path().to_lowercase();
        self.skip_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Returns true if `url` is in scope for `seed_domain` under the default exclusions
///
/// # Examples
///
/// ```
/// use wavecrawl::url::in_scope;
///
/// assert!(in_scope("https://en.wikipedia.org/wiki/Rust", "wikipedia.org"));
/// assert!(!in_scope("https://en.wikipedia.org/login", "wikipedia.org"));
/// assert!(!in_scope("https://example.com/", "wikipedia.org"));
/// ```
pub fn in_scope(url: &str, seed_domain: &str) -> bool {
    ScopeFilter::new(seed_domain, &ScopeConfig::default()).in_scope(url)
}

/// Returns true if `url` ends in one of the default non-HTML extensions
///
/// # Examples
///
/// ```
/// use wavecrawl::url::should_skip_url;
///
/// assert!(should_skip_url("https://example.com/logo.PNG"));
/// assert!(!should_skip_url("https://example.com/about"));
/// ```
pub fn should_skip_url(url: &str) -> bool {
    ScopeFilter::new("", &ScopeConfig::default()).should_skip(url)
}
