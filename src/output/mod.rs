//! Output module for persisting crawl results
//!
//! This module handles:
//! - Saving fetched pages through a [`Sink`]
//! - Writing the manifest of visited URLs
//! - Summarising a run in a [`CrawlReport`]

mod files;
mod memory;
pub mod stats;
mod traits;

pub use files::{page_key, FileSink, MANIFEST_HEADER};
pub use memory::MemorySink;
pub use stats::{print_report, CrawlReport};
pub use traits::{OutputError, OutputResult, Sink};
