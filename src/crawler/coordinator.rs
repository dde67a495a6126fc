//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns the frontier and runs the crawl as a sequence of batches:
//! - Draw up to `max_workers` URLs from the front of the queue
//! - Spawn one worker task per URL (scope, robots, fetch, delay, save, extract)
//! - Wait for the whole batch, then merge results in dispatch order
//! - Stop when the queue is empty or the page budget is spent, then write the manifest
//!
//! Workers never touch the frontier. They return their discovered links and the
//! coordinator is the only writer, which keeps deduplication race-free.

use crate::config::{validate, Config};
use crate::crawler::fetcher::{FetchClient, RetryPolicy};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::parse_html;
use crate::crawler::politeness::DelayPolicy;
use crate::output::{CrawlReport, Sink};
use crate::robots::PolicyGate;
use crate::state::{PageOutcome, RunState};
use crate::url::{canonical_url, ScopeFilter};
use crate::CrawlError;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Immutable limits for a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlBudget {
    /// Maximum number of pages to visit
    pub max_pages: usize,

    /// Maximum number of URLs dispatched per batch
    pub max_workers: usize,

    /// Pause each worker takes after its fetch
    pub delay: DelayPolicy,

    /// Fetch attempts and backoff per URL
    pub retry: RetryPolicy,
}

impl CrawlBudget {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pages: config.crawl.max_pages,
            max_workers: config.crawl.max_workers,
            delay: DelayPolicy::from_config(&config.politeness),
            retry: RetryPolicy::from_config(&config.retry),
        }
    }

    /// Size of the next batch given how many pages are already visited
    ///
    /// Never more than the remaining page budget, so the visited set cannot overshoot
    /// `max_pages` even if every URL in the batch succeeds.
    pub fn batch_size(&self, visited: usize) -> usize {
        self.max_workers
            .min(self.max_pages.saturating_sub(visited))
    }
}

/// Transient result of processing one URL
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// The dispatched URL
    pub url: String,

    /// In-scope links found on the page, in document order
    pub discovered_links: Vec<String>,

    /// What happened to the URL
    pub outcome: PageOutcome,
}

impl CrawlResult {
    fn skipped(url: String, outcome: PageOutcome) -> Self {
        Self {
            url,
            discovered_links: Vec::new(),
            outcome,
        }
    }
}

/// Everything a worker task needs, shared across the batch
#[derive(Clone)]
struct Worker {
    scope: Arc<ScopeFilter>,
    gate: Arc<PolicyGate>,
    fetcher: Arc<FetchClient>,
    sink: Arc<dyn Sink>,
    delay: DelayPolicy,
    attempts: u32,
}

impl Worker {
    /// Runs the per-URL pipeline
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The URL was processed (whatever its outcome)
    /// * `Err(CrawlError)` - The page could not be persisted, or the save task panicked
    async fn process(self, url: String) -> Result<CrawlResult, CrawlError> {
        if !self.scope.in_scope(&url) {
            tracing::debug!("Out of scope: {}", url);
            return Ok(CrawlResult::skipped(url, PageOutcome::OutOfScope));
        }

        if !self.gate.allowed(&url).await {
            return Ok(CrawlResult::skipped(url, PageOutcome::RobotsDenied));
        }

        let html = self.fetcher.fetch(&url, self.attempts).await;
        self.delay.wait().await;

        if html.is_empty() {
            return Ok(CrawlResult::skipped(url, PageOutcome::FetchFailed));
        }

        // Sinks do blocking file I/O
        let sink = Arc::clone(&self.sink);
        let page_url = url.clone();
        let html = tokio::task::spawn_blocking(move || sink.save(&page_url, &html).map(|_| html))
            .await
            .map_err(|e| CrawlError::Worker {
                url: url.clone(),
                message: e.to_string(),
            })??;

        let base = Url::parse(&url)?;
        let parsed = parse_html(&html, &base);
        let discovered_links: Vec<String> = parsed
            .links
            .into_iter()
            .filter(|link| self.scope.in_scope(link))
            .collect();

        tracing::info!(
            "Saved {}{} ({} in-scope links)",
            url,
            parsed
                .title
                .map(|t| format!(" \"{}\"", t))
                .unwrap_or_default(),
            discovered_links.len()
        );

        Ok(CrawlResult {
            url,
            discovered_links,
            outcome: PageOutcome::Fetched,
        })
    }
}

/// Breadth-first crawl engine for a single registrable domain
pub struct Crawler {
    seed: String,
    budget: CrawlBudget,
    worker: Worker,
    frontier: Frontier,
    state: RunState,
}

impl Crawler {
    /// Creates a crawler from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Destination for fetched pages and the manifest
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration or seed, or HTTP client setup failed
    pub fn new(config: &Config, sink: Arc<dyn Sink>) -> Result<Self, CrawlError> {
        validate(config)?;

        let invalid_seed = |e: crate::UrlError| CrawlError::InvalidSeed {
            url: config.crawl.seed.clone(),
            reason: e.to_string(),
        };
        let seed = canonical_url(&config.crawl.seed).map_err(invalid_seed)?;
        let scope = ScopeFilter::for_seed(&seed, &config.scope).map_err(invalid_seed)?;

        let timeout = Duration::from_secs(config.fetch.timeout_secs);
        let gate = PolicyGate::new(&config.robots, timeout)?;
        let fetcher = FetchClient::from_config(&config.fetch, &config.retry)?;

        Ok(Self::from_parts(
            &seed,
            CrawlBudget::from_config(config),
            scope,
            gate,
            fetcher,
            sink,
        ))
    }

    /// Creates a crawler from already built components
    ///
    /// A seed that parses as a URL is stored in its serialized form, the same form
    /// discovered links take.
    pub fn from_parts(
        seed: &str,
        budget: CrawlBudget,
        scope: ScopeFilter,
        gate: PolicyGate,
        fetcher: FetchClient,
        sink: Arc<dyn Sink>,
    ) -> Self {
        let seed = canonical_url(seed).unwrap_or_else(|_| seed.to_string());
        Self {
            frontier: Frontier::new(&seed),
            seed,
            budget,
            worker: Worker {
                scope: Arc::new(scope),
                gate: Arc::new(gate),
                fetcher: Arc::new(fetcher),
                sink,
                delay: budget.delay,
                attempts: budget.retry.attempts,
            },
            state: RunState::Running,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The frontier as the coordinator currently sees it
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs the crawl to completion and writes the manifest
    ///
    /// Individual page failures never abort the run; only a failure to write the
    /// manifest is returned as an error.
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlError> {
        let started = Instant::now();
        let mut report = CrawlReport::new(&self.seed);

        tracing::info!(
            "Starting crawl of {} (domain {}, max {} pages, {} workers)",
            self.seed,
            self.worker.scope.seed_domain(),
            self.budget.max_pages,
            self.budget.max_workers
        );

        while !self.state.is_done() {
            let size = self.budget.batch_size(self.frontier.visited_len());
            if size == 0 || self.frontier.is_empty() {
                self.state = RunState::Done;
                break;
            }

            let batch = self.frontier.next_batch(size);
            report.batches += 1;
            tracing::info!(
                "Batch {}: dispatching {} URLs ({} pending, {} visited)",
                report.batches,
                batch.len(),
                self.frontier.pending_len(),
                self.frontier.visited_len()
            );

            self.run_batch(batch, &mut report).await;
        }

        self.worker.sink.manifest(self.frontier.visited())?;

        report.state = self.state;
        report.visited = self.frontier.visited().to_vec();
        report.pending_left = self.frontier.pending_len();
        report.elapsed = started.elapsed();

        tracing::info!(
            "Crawl finished: {} pages visited in {} batches, {} pending left ({:.1}s)",
            report.pages_visited(),
            report.batches,
            report.pending_left,
            report.elapsed.as_secs_f64()
        );

        Ok(report)
    }

    /// Dispatches one batch, waits for all of it, and merges the results
    async fn run_batch(&mut self, batch: Vec<String>, report: &mut CrawlReport) {
        let mut dispatched = Vec::with_capacity(batch.len());
        let mut handles = Vec::with_capacity(batch.len());

        for url in batch {
            if self.frontier.is_visited(&url) {
                report.record(PageOutcome::AlreadyVisited);
                continue;
            }

            let worker = self.worker.clone();
            let task_url = url.clone();
            handles.push(tokio::spawn(async move { worker.process(task_url).await }));
            dispatched.push(url);
        }

        let results = join_all(handles).await;

        let mut discovered = Vec::new();
        for (url, joined) in dispatched.into_iter().zip(results) {
            let processed = joined.unwrap_or_else(|e| {
                Err(CrawlError::Worker {
                    url: url.clone(),
                    message: e.to_string(),
                })
            });

            let result = match processed {
                Ok(result) => result,
                Err(e @ CrawlError::Worker { .. }) => {
                    tracing::error!("{}", e);
                    report.record(PageOutcome::WorkerFailed);
                    continue;
                }
                Err(e) => {
                    tracing::error!("Worker failed on {}: {}", url, e);
                    report.record(PageOutcome::WorkerFailed);
                    continue;
                }
            };

            report.record(result.outcome);
            if result.outcome.is_success() && self.frontier.mark_visited(&result.url) {
                discovered.push(result.discovered_links);
            }
        }

        // All successes are visited before any link is merged
        let mut added = 0;
        for links in discovered {
            added += self.frontier.offer(links);
        }
        tracing::debug!("Queued {} new URLs", added);
    }
}
