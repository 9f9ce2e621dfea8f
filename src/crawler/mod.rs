//! Crawler module for page fetching and article extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and backoff
//! - HTML parsing and article field extraction
//! - Publish-date parsing across the formats news sites use
//! - The BFS frontier and visited set
//! - Round-by-round crawl coordination

mod coordinator;
mod date;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{ArticleStream, CrawlSettings, Crawler, RunStats};
pub use date::parse_date;
pub use fetcher::{build_http_client, retry, Fetch, HttpFetcher, RetryPolicy};
pub use frontier::{Frontier, FrontierItem, VisitedSet};
pub use parser::Page;

use crate::config::Config;
use crate::url::{canonicalize, CanonicalUrl};

/// Builds an HTTP-backed crawler from a loaded configuration
///
/// # Returns
///
/// * `Ok(Crawler<HttpFetcher>)` - A crawler ready to run
/// * `Err(reqwest::Error)` - The HTTP client could not be built
pub fn crawler_from_config(config: &Config) -> Result<Crawler<HttpFetcher>, reqwest::Error> {
    let fetcher = HttpFetcher::from_config(&config.fetch)?;
    Ok(Crawler::new(
        fetcher,
        CrawlSettings::from_config(&config.crawler),
    ))
}

/// Canonicalizes the configured seed URLs
pub fn seeds_from_config(config: &Config) -> Vec<CanonicalUrl> {
    config
        .crawler
        .seeds
        .iter()
        .map(|seed| canonicalize(seed))
        .collect()
}
