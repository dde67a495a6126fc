//! Wavecrawl main entry point
//!
//! This is the command-line interface for the Wavecrawl site crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use wavecrawl::config::{load_config_with_hash, Config, Overrides};
use wavecrawl::crawler::{crawl, CrawlBudget, DelayPolicy};
use wavecrawl::output::print_report;
use wavecrawl::url::{canonical_url, registrable_domain};
use tracing_subscriber::EnvFilter;

/// Wavecrawl: a polite breadth-first site crawler
///
/// Wavecrawl starts from a seed URL and crawls pages within the seed's registrable
/// domain, respecting robots.txt and skipping non-HTML resources. Pages are saved to
/// disk and the visited URLs are listed in a CSV manifest.
#[derive(Parser, Debug)]
#[command(name = "wavecrawl")]
#[command(version)]
#[command(about = "A polite breadth-first site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the seed URL from the config file
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Override the maximum number of pages to visit
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Override the number of concurrent workers per batch
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let overrides = Overrides {
        seed: cli.seed.clone(),
        max_pages: cli.max_pages,
        max_workers: cli.workers,
    };

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config, &overrides)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);
    if !overrides.is_empty() {
        tracing::info!("Command-line overrides applied");
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let report = crawl(&config).await.context("Crawl failed")?;
    print_report(&report);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wavecrawl=info,warn"),
            1 => EnvFilter::new("wavecrawl=debug,info"),
            2 => EnvFilter::new("wavecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective crawl plan
fn handle_dry_run(config: &Config) {
    let budget = CrawlBudget::from_config(config);
    let domain = url::Url::parse(&config.crawl.seed)
        .ok()
        .and_then(|u| u.host_str().map(registrable_domain))
        .unwrap_or_default();

    println!("=== Wavecrawl Dry Run ===\n");

    println!("Crawl:");
    println!(
        "  Seed: {}",
        canonical_url(&config.crawl.seed).unwrap_or_else(|_| config.crawl.seed.clone())
    );
    println!("  Scope: *.{}", domain);
    println!("  Max pages: {}", budget.max_pages);
    println!("  Workers per batch: {}", budget.max_workers);
    println!(
        "  Max batches (all fetches succeeding): {}",
        budget.max_pages.div_ceil(budget.max_workers) + 1
    );

    println!("\nPoliteness:");
    match budget.delay {
        DelayPolicy::Fixed(delay) => println!("  Fixed delay: {}ms", delay.as_millis()),
        DelayPolicy::Range { min, max } => {
            println!("  Random delay: {}-{}ms", min.as_millis(), max.as_millis())
        }
    }
    println!(
        "  Retry: {} attempts, backoff {}ms + {}ms per attempt",
        budget.retry.attempts,
        budget.retry.base_delay.as_millis(),
        budget.retry.increment.as_millis()
    );

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  User agents: {}", config.fetch.user_agents.len());
    println!("  Proxies: {}", config.fetch.proxies.len());
    if let Some(endpoint) = &config.fetch.relay_endpoint {
        println!("  Relay: {}", endpoint);
    }

    println!("\nRobots:");
    println!("  Agent: {}", config.robots.agent);
    println!("  Fallback: {:?}", config.robots.fallback);

    println!("\nScope exclusions:");
    println!("  Paths: {}", config.scope.excluded_paths.join(", "));
    println!("  Query params: {}", config.scope.excluded_query_params.join(", "));
    println!("  Extensions: {}", config.scope.skip_extensions.join(" "));

    println!("\nOutput:");
    println!("  Pages: {}", config.output.pages_dir);
    println!("  Manifest: {}", config.output.manifest_path);

    println!("\n✓ Configuration is valid");
}
