//! Rabbit crawler: discovers news articles by following related links
//!
//! This crate walks a news site breadth-first from a set of section pages,
//! scrapes every reachable article page within a depth budget, and yields a
//! deduplicated stream of structured [`Article`] records.

pub mod article;
pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Failure to extract a required field from an otherwise fetched page
///
/// Every variant is structural: the page will never gain the missing field
/// by fetching it again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Unrecognized date format \"{0}\"")]
    UnrecognizedFormat(String),
}

impl ScrapeError {
    /// Returns true for failures caused by the page content itself
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::UnrecognizedFormat(_))
    }
}

/// Errors produced while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url} (attempt {attempt})")]
    Timeout { url: String, attempt: u32 },

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Returns true if another attempt could succeed
    ///
    /// Transport errors, timeouts, server errors and 429 are retryable.
    /// Any other status is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::RetriesExhausted { .. } => false,
        }
    }
}

/// Per-URL failure of a crawl task
///
/// None of these abort a run; they only drop the URL that produced them.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("Worker failed: {0}")]
    Worker(String),
}

impl CrawlError {
    /// Returns true if the page was fetched but is not an article
    pub fn is_structural(&self) -> bool {
        match self {
            Self::Scrape(e) => e.is_structural(),
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while delivering articles downstream
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("HTTP error posting to {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Ingestion endpoint rejected article with status {status}")]
    Rejected { status: u16 },

    #[error("Failed to serialize article: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for per-URL crawl work
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;

// Re-export commonly used types
pub use article::{Article, ArticleRecord};
pub use config::Config;
pub use crawler::{ArticleStream, CrawlSettings, Crawler, Fetch, HttpFetcher, RetryPolicy};
pub use url::{canonicalize, is_news_article, CanonicalUrl};
