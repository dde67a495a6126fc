//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - The frontier of visited and pending URLs
//! - Politeness delays
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod politeness;

pub use coordinator::{CrawlBudget, CrawlResult, Crawler};
pub use fetcher::{build_http_client, FetchClient, FetchOutcome, RetryPolicy};
pub use frontier::Frontier;
pub use parser::{extract_links, parse_html, ParsedPage};
pub use politeness::DelayPolicy;

use crate::config::Config;
use crate::output::{CrawlReport, FileSink};
use crate::CrawlError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the pages directory
/// 2. Build the policy gate and fetch client
/// 3. Crawl in batches until the frontier drains or the page budget is spent
/// 4. Write the CSV manifest of visited URLs
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed and the manifest was written
/// * `Err(CrawlError)` - Setup failed or the manifest could not be written
pub async fn crawl(config: &Config) -> Result<CrawlReport, CrawlError> {
    let sink = Arc::new(FileSink::from_config(&config.output)?);
    let mut crawler = Crawler::new(config, sink)?;
    crawler.run().await
}
