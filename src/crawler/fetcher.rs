//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients, optionally routed through a proxy
//! - Randomized browser identity headers per request
//! - Routing through a fetch relay when one is configured
//! - Bounded retries with linear backoff for transient failures
//! - Error classification

use crate::config::{FetchConfig, RetryConfig};
use crate::CrawlError;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Proxy, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// Result of a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Status 200 with an HTML content type
    Html(String),

    /// The server answered, but not with an HTML page
    Rejected {
        /// The HTTP status code
        status: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
    },

    /// Network-level failure (connect error, timeout, body read failure)
    Transient(String),

    /// The request could not be built for this URL
    Invalid(String),
}

impl FetchOutcome {
    /// Returns true if another attempt could succeed
    ///
    /// Only network-level failures are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchOutcome::Transient(_))
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Html(body) => write!(f, "HTML page ({} bytes)", body.len()),
            FetchOutcome::Rejected {
                status,
                content_type,
            } => write!(f, "status {} content-type '{}'", status, content_type),
            FetchOutcome::Transient(error) => write!(f, "{}", error),
            FetchOutcome::Invalid(error) => write!(f, "invalid request: {}", error),
        }
    }
}

/// Linear backoff between fetch attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made per URL
    pub attempts: u32,

    /// Delay after the first failed attempt
    pub base_delay: Duration,

    /// Added to the delay for each further attempt
    pub increment: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            increment: Duration::from_millis(config.increment_ms),
        }
    }

    /// Delay to wait after the attempt with zero-based index `attempt_index` fails
    ///
    /// # Example
    ///
    /// ```
    /// use wavecrawl::crawler::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy {
    ///     attempts: 3,
    ///     base_delay: Duration::from_millis(1500),
    ///     increment: Duration::from_millis(1000),
    /// };
    /// assert_eq!(policy.delay_for(0), Duration::from_millis(1500));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(3500));
    /// ```
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay + self.increment * attempt_index
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[derive(Debug, Clone)]
struct Relay {
    endpoint: Url,
    token: String,
}

/// Builds an HTTP client for page fetches
///
/// # Arguments
///
/// * `timeout` - Per-request timeout covering connect and body read
/// * `proxy` - Optional proxy URL all requests are routed through
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Invalid proxy or TLS backend failure
pub fn build_http_client(timeout: Duration, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().timeout(timeout).gzip(true).brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// HTTP GET with randomized identity and bounded retries
///
/// The client never fails past its boundary: every outcome other than an HTML page
/// collapses to an empty body.
#[derive(Debug, Clone)]
pub struct FetchClient {
    clients: Vec<Client>,
    user_agents: Vec<String>,
    relay: Option<Relay>,
    retry: RetryPolicy,
}

impl FetchClient {
    /// Creates a fetch client from explicit parts
    ///
    /// One of `clients` is picked at random per request; an empty list gets a default
    /// client. An empty `user_agents` list leaves the client's own identity in place.
    pub fn new(clients: Vec<Client>, user_agents: Vec<String>, retry: RetryPolicy) -> Self {
        let clients = if clients.is_empty() {
            vec![Client::new()]
        } else {
            clients
        };

        Self {
            clients,
            user_agents,
            relay: None,
            retry,
        }
    }

    /// Creates a fetch client from configuration
    ///
    /// One HTTP client is built per configured proxy, or a single direct client when
    /// no proxies are configured.
    pub fn from_config(fetch: &FetchConfig, retry: &RetryConfig) -> Result<Self, CrawlError> {
        let timeout = Duration::from_secs(fetch.timeout_secs);

        let clients = if fetch.proxies.is_empty() {
            vec![build_http_client(timeout, None)?]
        } else {
            fetch
                .proxies
                .iter()
                .map(|proxy| build_http_client(timeout, Some(proxy)))
                .collect::<Result<Vec<_>, _>>()?
        };

        let client = Self::new(
            clients,
            fetch.user_agents.clone(),
            RetryPolicy::from_config(retry),
        );

        match (&fetch.relay_endpoint, &fetch.relay_token) {
            (Some(endpoint), Some(token)) => Ok(client.with_relay(Url::parse(endpoint)?, token)),
            _ => Ok(client),
        }
    }

    /// Routes page requests through a relay endpoint
    ///
    /// Requests go to `{endpoint}?token={token}&url={target}` instead of the target.
    pub fn with_relay(mut self, endpoint: Url, token: &str) -> Self {
        self.relay = Some(Relay {
            endpoint,
            token: token.to_string(),
        });
        self
    }

    /// Fetches a page, retrying transient failures up to `attempt_budget` attempts
    ///
    /// # Returns
    ///
    /// The HTML body, or an empty string if the page could not be fetched as HTML
    pub async fn fetch(&self, url: &str, attempt_budget: u32) -> String {
        let budget = attempt_budget.max(1);

        for attempt in 0..budget {
            let outcome = self.fetch_once(url).await;
            if !outcome.is_retryable() {
                return match outcome {
                    FetchOutcome::Html(body) => {
                        tracing::debug!("Fetched {} ({} bytes)", url, body.len());
                        body
                    }
                    other => {
                        tracing::debug!("Skipping {}: {}", url, other);
                        String::new()
                    }
                };
            }

            tracing::warn!(
                "Attempt {}/{} for {} failed: {}",
                attempt + 1,
                budget,
                url,
                outcome
            );
            if attempt + 1 < budget {
                tokio::time::sleep(self.retry.delay_for(attempt)).await;
            }
        }

        tracing::warn!("Giving up on {} after {} attempts", url, budget);
        String::new()
    }

    /// Makes a single request and classifies the result
    pub async fn fetch_once(&self, url: &str) -> FetchOutcome {
        let target = match self.request_url(url) {
            Ok(target) => target,
            Err(e) => return FetchOutcome::Invalid(e.to_string()),
        };

        let (client, user_agent) = self.pick_identity();

        let mut request = client
            .get(target)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE);
        if let Some(user_agent) = user_agent {
            request = request.header(USER_AGENT, user_agent);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => return FetchOutcome::Invalid(e.to_string()),
            Err(e) => return FetchOutcome::Transient(describe_error(&e)),
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if status != StatusCode::OK || !content_type.to_lowercase().contains("html") {
            return FetchOutcome::Rejected {
                status: status.as_u16(),
                content_type,
            };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Html(body),
            Err(e) => FetchOutcome::Transient(describe_error(&e)),
        }
    }

    fn request_url(&self, url: &str) -> Result<Url, url::ParseError> {
        let target = Url::parse(url)?;

        match &self.relay {
            Some(relay) => {
                let mut relayed = relay.endpoint.clone();
                relayed
                    .query_pairs_mut()
                    .append_pair("token", &relay.token)
                    .append_pair("url", target.as_str());
                Ok(relayed)
            }
            None => Ok(target),
        }
    }

    fn pick_identity(&self) -> (&Client, Option<&str>) {
        let mut rng = rand::thread_rng();
        let client = self.clients.choose(&mut rng).unwrap_or(&self.clients[0]);
        let user_agent = self.user_agents.choose(&mut rng).map(String::as_str);
        (client, user_agent)
    }
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}
