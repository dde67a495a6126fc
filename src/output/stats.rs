//! End-of-run crawl report
//!
//! The coordinator fills a report while it runs; the binary prints it once the
//! manifest has been written.

use crate::state::{PageOutcome, RunState};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Summary of a finished (or aborted) crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The seed URL the run started from
    pub seed: String,

    /// Final engine state
    pub state: RunState,

    /// Visited URLs in the order they were recorded (the manifest)
    pub visited: Vec<String>,

    /// Number of batches dispatched
    pub batches: usize,

    /// Count of dispatched URLs by outcome
    pub outcomes: BTreeMap<PageOutcome, usize>,

    /// Discovered URLs never dispatched
    pub pending_left: usize,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Creates an empty report for a run starting now
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            state: RunState::Running,
            visited: Vec::new(),
            batches: 0,
            outcomes: BTreeMap::new(),
            pending_left: 0,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Counts one dispatched URL
    pub fn record(&mut self, outcome: PageOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: PageOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Total URLs dispatched to workers
    pub fn dispatched(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// URLs filtered out before any page request
    pub fn skipped(&self) -> usize {
        self.sum_where(PageOutcome::is_skipped)
    }

    /// URLs whose fetch or worker went wrong
    pub fn failed(&self) -> usize {
        self.sum_where(PageOutcome::is_failure)
    }

    fn sum_where(&self, category: fn(&PageOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| category(outcome))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn pages_visited(&self) -> usize {
        self.visited.len()
    }

    /// Share of dispatched URLs that were fetched, as a percentage
    pub fn success_rate(&self) -> f64 {
        let dispatched = self.dispatched();
        if dispatched == 0 {
            return 0.0;
        }
        (self.count(PageOutcome::Fetched) as f64 / dispatched as f64) * 100.0
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Seed: {}", report.seed);
    println!("  State: {}", report.state);
    println!(
        "  Started: {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!("  Batches: {}", report.batches);
    println!("  Pages visited: {}", report.pages_visited());
    println!("  Pending left: {}", report.pending_left);
    println!();

    if report.dispatched() > 0 {
        println!("Outcomes:");
        for outcome in PageOutcome::all() {
            println!("  {}: {}", outcome, report.count(outcome));
        }
        println!(
            "  ({} skipped, {} failed)",
            report.skipped(),
            report.failed()
        );
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} dispatched URLs fetched)",
        report.success_rate(),
        report.count(PageOutcome::Fetched),
        report.dispatched()
    );
}
