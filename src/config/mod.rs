//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) yields a
//! crawl of the built-in seed pages.
//!
//! # Example
//!
//! ```no_run
//! use rabbit_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("rabbit.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, IngestConfig, DEFAULT_SEEDS};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
