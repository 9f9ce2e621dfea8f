use serde::Deserialize;

/// Section pages the crawler starts from when no config file is given
pub const DEFAULT_SEEDS: &[&str] = &[
    "https://www.bbc.co.uk/news/uk",
    "https://www.bbc.co.uk/news/world",
    "https://www.bbc.co.uk/news/business",
    "https://www.bbc.co.uk/news/politics",
    "https://www.bbc.co.uk/news/technology",
    "https://www.bbc.co.uk/news/science_and_environment",
    "https://www.bbc.co.uk/news/health",
    "https://www.bbc.co.uk/news/education",
    "https://www.bbc.co.uk/news/entertainment_and_arts",
];

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub ingest: Option<IngestConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Section pages to start from (depth 0)
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,

    /// Maximum number of related-link hops from a seed
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent page fetches
    #[serde(rename = "worker-pool-size", default = "default_worker_pool_size")]
    pub worker_pool_size: u32,
}

/// Page fetch and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Attempts per page, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Multiplier applied to the delay after every failed attempt
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: u32,

    /// Timeout of a single attempt (milliseconds)
    #[serde(rename = "attempt-timeout-ms", default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Ingestion endpoint the CLI posts articles to
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub endpoint: String,

    /// Sent as the `X-Api-Key` header
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seeds: default_seeds(),
            max_depth: default_max_depth(),
            worker_pool_size: default_worker_pool_size(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_factor: default_backoff_factor(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_seeds() -> Vec<String> {
    DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect()
}

fn default_max_depth() -> u32 {
    5
}

fn default_worker_pool_size() -> u32 {
    32
}

fn default_max_attempts() -> u32 {
    10
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_factor() -> u32 {
    2
}

fn default_attempt_timeout_ms() -> u64 {
    5000
}

fn default_user_agent() -> String {
    format!("rabbit-crawler/{}", env!("CARGO_PKG_VERSION"))
}
