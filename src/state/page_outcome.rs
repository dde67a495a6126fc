//! Per-URL outcome definitions
//!
//! Every URL drawn from the frontier ends a batch in exactly one of these outcomes.

use std::fmt;

/// What happened to a dispatched URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageOutcome {
    // ===== Success =====
    /// Page was fetched as HTML, saved, and its links extracted
    Fetched,

    // ===== Skips =====
    /// URL was already visited when its batch was drawn
    AlreadyVisited,

    /// URL failed the scope filter
    OutOfScope,

    /// robots.txt (or the fallback decision) disallowed the URL
    RobotsDenied,

    // ===== Failures =====
    /// Fetch returned no HTML (non-200, non-HTML, or retries exhausted)
    FetchFailed,

    /// The worker errored or panicked
    WorkerFailed,
}

impl PageOutcome {
    /// Returns true if the URL counts as visited
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched)
    }

    /// Returns true if the URL was filtered out before any page request
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::AlreadyVisited | Self::OutOfScope | Self::RobotsDenied
        )
    }

    /// Returns true if a page request or worker went wrong
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::WorkerFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::AlreadyVisited => "already_visited",
            Self::OutOfScope => "out_of_scope",
            Self::RobotsDenied => "robots_denied",
            Self::FetchFailed => "fetch_failed",
            Self::WorkerFailed => "worker_failed",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 6] {
        [
            Self::Fetched,
            Self::AlreadyVisited,
            Self::OutOfScope,
            Self::RobotsDenied,
            Self::FetchFailed,
            Self::WorkerFailed,
        ]
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
