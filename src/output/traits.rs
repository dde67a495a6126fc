//! Sink trait and output errors
//!
//! A sink receives every fetched page during the crawl and the final list of visited
//! URLs once the crawl is done. Implementations are shared across worker tasks and
//! must be thread-safe.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for crawl results
pub trait Sink: Send + Sync {
    /// Persists the body of a fetched page
    ///
    /// # Arguments
    ///
    /// * `url` - The page URL
    /// * `html` - The page body (never empty)
    fn save(&self, url: &str, html: &str) -> OutputResult<()>;

    /// Records the final list of visited URLs
    ///
    /// Called exactly once, when the crawl reaches `Done`. The list holds no duplicates.
    fn manifest(&self, visited: &[String]) -> OutputResult<()>;
}
