//! Robots.txt handling module
//!
//! This module provides the policy gate consulted before every page fetch. It fetches
//! robots.txt once per site, caches the parsed ruleset for the rest of the run, and
//! applies a configurable fallback when the file cannot be retrieved or parsed.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::ParsedRobots;

use crate::config::{RobotsConfig, RobotsFallback};
use crate::url::{robots_url_for, site_key};
use crate::CrawlError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Reasons a robots.txt document could not be used
#[derive(Debug, Error)]
pub enum RobotsError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("content is not a robots.txt document")]
    Unparseable,
}

/// Fetches and parses robots.txt
///
/// Anything other than a 200 response with a recognisable robots.txt body is an error.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `robots_url` - The robots.txt URL
pub async fn fetch_robots(client: &Client, robots_url: &Url) -> Result<ParsedRobots, RobotsError> {
    let response = client.get(robots_url.clone()).send().await?;

    if response.status() != StatusCode::OK {
        return Err(RobotsError::Status(response.status().as_u16()));
    }

    let body = response.text().await?;
    ParsedRobots::parse(&body).ok_or(RobotsError::Unparseable)
}

/// Answers whether a URL may be crawled according to its site's robots.txt
#[derive(Debug)]
pub struct PolicyGate {
    client: Client,
    cache: RobotsCache,
    agent: String,
    fallback: RobotsFallback,
}

impl PolicyGate {
    /// Creates a gate with its own HTTP client identifying as the configured agent
    pub fn new(config: &RobotsConfig, timeout: Duration) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(config.agent.clone())
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a gate around an existing HTTP client
    pub fn with_client(client: Client, config: &RobotsConfig) -> Self {
        Self {
            client,
            cache: RobotsCache::new(),
            agent: config.agent.clone(),
            fallback: config.fallback,
        }
    }

    /// The per-site cache backing this gate
    pub fn cache(&self) -> &RobotsCache {
        &self.cache
    }

    /// Returns true if `url` may be fetched
    ///
    /// The first call for a site fetches its robots.txt; later calls, including
    /// concurrent ones, reuse the cached result. URLs without a usable site are denied.
    pub async fn allowed(&self, url: &str) -> bool {
        let robots_url = match robots_url_for(url) {
            Ok(robots_url) => robots_url,
            Err(e) => {
                tracing::debug!("Cannot derive robots.txt for {}: {}", url, e);
                return false;
            }
        };

        let Some(site) = site_key(&robots_url) else {
            return false;
        };

        let cell = self.cache.cell(&site);
        let entry = cell
            .get_or_init(|| self.resolve(robots_url))
            .await;

        let allowed = entry.is_allowed(url, &self.agent, self.fallback);
        if !allowed && entry.fallback_used() {
            tracing::info!("URL {} denied by the robots.txt fallback", url);
        } else if !allowed {
            tracing::info!("URL {} disallowed by robots.txt", url);
        }
        allowed
    }

    async fn resolve(&self, robots_url: Url) -> CachedRobots {
        tracing::debug!("Fetching robots.txt: {}", robots_url);

        match fetch_robots(&self.client, &robots_url).await {
            Ok(robots) => CachedRobots::new(robots),
            Err(e) => {
                tracing::warn!(
                    "robots.txt unavailable at {} ({}); falling back to {}",
                    robots_url,
                    e,
                    if self.fallback.allows() { "allow" } else { "deny" }
                );
                CachedRobots::fallback()
            }
        }
    }
}
