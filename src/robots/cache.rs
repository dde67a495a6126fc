//! Robots.txt caching implementation
//!
//! Entries are keyed by site (scheme, host and port) and live for the whole crawl run.
//! Each key owns a `OnceCell`, so concurrent first lookups for the same site share a
//! single robots.txt fetch.

use crate::config::RobotsFallback;
use crate::robots::ParsedRobots;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Cached robots.txt data for a site
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed ruleset, or `None` when the fallback decision applies
    ruleset: Option<ParsedRobots>,

    /// When the robots.txt was fetched (or the fetch failed)
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates an entry holding a parsed ruleset
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            ruleset: Some(content),
            fetched_at: Utc::now(),
        }
    }

    /// Creates the sentinel entry used when robots.txt could not be retrieved or parsed
    pub fn fallback() -> Self {
        Self {
            ruleset: None,
            fetched_at: Utc::now(),
        }
    }

    /// Returns true if this entry is the fallback sentinel
    pub fn fallback_used(&self) -> bool {
        self.ruleset.is_none()
    }

    /// Checks if a URL is allowed according to this entry
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to check
    /// * `user_agent` - The agent identity
    /// * `fallback` - Decision applied when this entry is the fallback sentinel
    pub fn is_allowed(&self, url: &str, user_agent: &str, fallback: RobotsFallback) -> bool {
        match &self.ruleset {
            Some(robots) => robots.is_allowed(url, user_agent),
            None => fallback.allows(),
        }
    }
}

/// Per-site robots.txt cache safe for concurrent use by crawl workers
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: DashMap<String, Arc<OnceCell<CachedRobots>>>,
}

impl RobotsCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell for a site, creating an empty one on first use
    ///
    /// The map guard is released before returning, so callers may await on the cell.
    pub fn cell(&self, site: &str) -> Arc<OnceCell<CachedRobots>> {
        self.entries.entry(site.to_string()).or_default().clone()
    }

    /// Returns the cached entry for a site if it has been resolved
    pub fn get(&self, site: &str) -> Option<CachedRobots> {
        self.entries
            .get(site)
            .and_then(|cell| cell.value().get().cloned())
    }

    /// Number of sites with a resolved entry
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// Returns true if no site has a resolved entry
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruleset_entry_delegates_to_content() {
        let robots = ParsedRobots::parse("User-agent: *\nDisallow: /admin").unwrap();
        let entry = CachedRobots::new(robots);

        assert!(!entry.fallback_used());
        assert!(entry.is_allowed("https://example.com/", "TestBot", RobotsFallback::Deny));
        assert!(!entry.is_allowed("https://example.com/admin", "TestBot", RobotsFallback::Allow));
    }

    #[test]
    fn test_fallback_entry_uses_configured_decision() {
        let entry = CachedRobots::fallback();

        assert!(entry.fallback_used());
        assert!(entry.ruleset.is_none());
        assert!(entry.is_allowed("https://example.com/", "TestBot", RobotsFallback::Allow));
        assert!(!entry.is_allowed("https://example.com/", "TestBot", RobotsFallback::Deny));
    }

    #[test]
    fn test_fetched_at_is_recent() {
        let entry = CachedRobots::fallback();
        let age = Utc::now() - entry.fetched_at;
        assert!(age.num_seconds() < 5);
    }

    #[tokio::test]
    async fn test_cell_is_shared_per_site() {
        let cache = RobotsCache::new();
        assert!(cache.is_empty());

        let first = cache.cell("https://example.com");
        let second = cache.cell("https://example.com");
        assert!(Arc::ptr_eq(&first, &second));

        first
            .get_or_init(|| async { CachedRobots::fallback() })
            .await;

        assert_eq!(cache.len(), 1);
        assert!(cache.get("https://example.com").unwrap().fallback_used());
        assert!(cache.get("https://other.example.com").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_initialisation_runs_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let cache = Arc::new(RobotsCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                let cell = cache.cell("https://example.com");
                cell.get_or_init(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    CachedRobots::new(ParsedRobots::allow_all())
                })
                .await
                .fallback_used()
            }));
        }

        for handle in handles {
            assert!(!handle.await.unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
