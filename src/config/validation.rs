use crate::config::types::{
    Config, CrawlSection, FetchConfig, OutputConfig, PolitenessConfig, RetryConfig, RobotsConfig,
    ScopeConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_section(&config.crawl)?;
    validate_politeness_config(&config.politeness)?;
    validate_retry_config(&config.retry)?;
    validate_fetch_config(&config.fetch)?;
    validate_robots_config(&config.robots)?;
    validate_scope_config(&config.scope)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the seed and page budget
fn validate_crawl_section(config: &CrawlSection) -> Result<(), ConfigError> {
    let seed = Url::parse(&config.seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed, e)))?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use http or https",
            config.seed
        )));
    }

    if seed.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' has no host",
            config.seed
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1, got 0".to_string(),
        ));
    }

    if config.max_workers < 1 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 100, got {}",
            config.max_workers
        )));
    }

    Ok(())
}

/// Validates the politeness delay settings
fn validate_politeness_config(config: &PolitenessConfig) -> Result<(), ConfigError> {
    // A fixed delay overrides the range, so the range is only checked without one
    if config.fixed_delay_ms.is_none() && config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates the retry budget
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.attempts < 1 {
        return Err(ConfigError::Validation(
            "retry attempts must be >= 1, got 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP fetch settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1, got 0".to_string(),
        ));
    }

    if config.user_agents.is_empty() || config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one non-empty identity".to_string(),
        ));
    }

    for proxy in &config.proxies {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    match (&config.relay_endpoint, &config.relay_token) {
        (Some(endpoint), Some(token)) => {
            Url::parse(endpoint).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid relay endpoint '{}': {}", endpoint, e))
            })?;
            if token.is_empty() {
                return Err(ConfigError::Validation(
                    "relay_token cannot be empty".to_string(),
                ));
            }
        }
        (Some(_), None) => {
            return Err(ConfigError::Validation(
                "relay_endpoint requires relay_token".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(ConfigError::Validation(
                "relay_token is set without relay_endpoint".to_string(),
            ));
        }
        (None, None) => {}
    }

    Ok(())
}

/// Validates robots.txt settings
fn validate_robots_config(config: &RobotsConfig) -> Result<(), ConfigError> {
    if config.agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "robots agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates scope exclusions
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    // An empty pattern would exclude every URL
    if config.excluded_paths.iter().any(String::is_empty)
        || config.excluded_query_params.iter().any(String::is_empty)
    {
        return Err(ConfigError::Validation(
            "excluded path and query patterns cannot be empty".to_string(),
        ));
    }

    for ext in &config.skip_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "skip extension '{}' must look like '.ext'",
                ext
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.pages_dir.is_empty() {
        return Err(ConfigError::Validation(
            "pages_dir cannot be empty".to_string(),
        ));
    }

    if config.manifest_path.is_empty() {
        return Err(ConfigError::Validation(
            "manifest_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
