use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Command-line overrides applied on top of a loaded configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<String>,
    pub max_pages: Option<usize>,
    pub max_workers: Option<usize>,
}

impl Overrides {
    /// Returns true if no override is set
    pub fn is_empty(&self) -> bool {
        self.seed.is_none() && self.max_pages.is_none() && self.max_workers.is_none()
    }

    fn apply(&self, config: &mut Config) {
        if let Some(seed) = &self.seed {
            config.crawl.seed = seed.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.crawl.max_pages = max_pages;
        }
        if let Some(max_workers) = self.max_workers {
            config.crawl.max_workers = max_workers;
        }
    }
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wavecrawl::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Max pages: {}", config.crawl.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_overrides(path, &Overrides::default())
}

/// Loads a configuration file, applies command-line overrides, then validates
pub fn load_config_with_overrides(
    path: &Path,
    overrides: &Overrides,
) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    overrides.apply(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Parses TOML content without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a crawl can be traced back to the exact file that drove it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(
    path: &Path,
    overrides: &Overrides,
) -> Result<(Config, String), ConfigError> {
    let config = load_config_with_overrides(path, overrides)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
