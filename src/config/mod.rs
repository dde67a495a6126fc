//! Configuration module for Wavecrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Only the `[crawl]` section with its `seed` is required; every other setting has a
//! default matching a polite single-site crawl.
//!
//! # Example
//!
//! ```no_run
//! use wavecrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlSection, FetchConfig, OutputConfig, PolitenessConfig, RetryConfig,
    RobotsConfig, RobotsFallback, ScopeConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_config_with_overrides,
    parse_config, Overrides,
};
pub use validation::validate;
