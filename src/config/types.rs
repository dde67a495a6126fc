use serde::Deserialize;

/// Main configuration structure for Wavecrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlSection,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration for `seed` with every other setting at its default
    pub fn with_seed(seed: &str) -> Self {
        Self {
            crawl: CrawlSection {
                seed: seed.to_string(),
                max_pages: default_max_pages(),
                max_workers: default_max_workers(),
            },
            politeness: PolitenessConfig::default(),
            retry: RetryConfig::default(),
            fetch: FetchConfig::default(),
            robots: RobotsConfig::default(),
            scope: ScopeConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Seed and page budget
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlSection {
    /// URL the crawl starts from; its registrable domain bounds the crawl
    pub seed: String,

    /// Maximum number of pages to visit
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum number of concurrent fetch workers per batch
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

/// Delay applied by each worker after its fetch
///
/// When `fixed-delay-ms` is set it takes precedence over the random range.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolitenessConfig {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default)]
    pub fixed_delay_ms: Option<u64>,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            fixed_delay_ms: None,
        }
    }
}

/// Retry budget and linear backoff for page fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Total attempts per URL, including the first
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Delay before the first retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Added to the delay for every further retry
    #[serde(default = "default_increment_ms")]
    pub increment_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            base_delay_ms: default_base_delay_ms(),
            increment_ms: default_increment_ms(),
        }
    }
}

/// HTTP fetch settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pool of browser identities; one is picked at random per request
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Optional proxy URLs; one is picked at random per request
    #[serde(default)]
    pub proxies: Vec<String>,

    /// Optional fetch relay endpoint (e.g. a scraping API)
    #[serde(default)]
    pub relay_endpoint: Option<String>,

    /// Token passed to the relay endpoint
    #[serde(default)]
    pub relay_token: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agents: default_user_agents(),
            proxies: Vec::new(),
            relay_endpoint: None,
            relay_token: None,
        }
    }
}

/// Decision applied when robots.txt cannot be retrieved or parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotsFallback {
    Allow,
    Deny,
}

impl RobotsFallback {
    /// Returns the boolean allow decision for this fallback
    pub fn allows(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Robots.txt policy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RobotsConfig {
    /// Agent identity evaluated against robots.txt groups
    #[serde(default = "default_agent")]
    pub agent: String,

    #[serde(default = "default_fallback")]
    pub fallback: RobotsFallback,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            agent: default_agent(),
            fallback: default_fallback(),
        }
    }
}

/// URL scope exclusions
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScopeConfig {
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,

    #[serde(default = "default_excluded_query_params")]
    pub excluded_query_params: Vec<String>,

    #[serde(default = "default_skip_extensions")]
    pub skip_extensions: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            excluded_paths: default_excluded_paths(),
            excluded_query_params: default_excluded_query_params(),
            skip_extensions: default_skip_extensions(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory that receives one HTML file per fetched page
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Path of the CSV manifest of visited URLs
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            manifest_path: default_manifest_path(),
        }
    }
}

fn default_max_pages() -> usize {
    50
}

fn default_max_workers() -> usize {
    5
}

fn default_min_delay_ms() -> u64 {
    1500
}

fn default_max_delay_ms() -> u64 {
    3500
}

fn default_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1500
}

fn default_increment_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    5
}

pub(crate) fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/114.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 Version/15.4 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/113.0",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148 Safari/604.1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_agent() -> String {
    "wavecrawl".to_string()
}

fn default_fallback() -> RobotsFallback {
    RobotsFallback::Allow
}

fn default_excluded_paths() -> Vec<String> {
    ["/login", "/admin", "/signup", "/cart", "/checkout"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_excluded_query_params() -> Vec<String> {
    ["q=", "search=", "filter="]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_skip_extensions() -> Vec<String> {
    [
        ".xml", ".json", ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".zip", ".rar", ".mp4",
        ".mp3", ".ico",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_manifest_path() -> String {
    "crawled_urls.csv".to_string()
}
