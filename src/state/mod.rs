//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunState`: The crawl engine's lifecycle (running until the frontier drains or the
//!   page budget is spent)
//! - `PageOutcome`: What happened to an individual dispatched URL

mod page_outcome;
mod run_state;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use run_state::RunState;
