//! Output module for delivering crawled articles
//!
//! The crawler only produces a stream of [`Article`]s; this module holds the
//! sinks the CLI hands them to:
//! - [`IngestSink`] posts each article's JSON record to an HTTP endpoint
//! - [`JsonLinesSink`] writes one JSON record per line to a writer

mod ingest;
mod json_lines;

pub use ingest::{IngestSink, API_KEY_HEADER};
pub use json_lines::JsonLinesSink;

use crate::article::Article;
use crate::OutputResult;
use async_trait::async_trait;

/// Trait for article sinks
///
/// Implementations must be thread-safe.
#[async_trait]
pub trait ArticleSink: Send + Sync {
    /// Delivers a single article
    ///
    /// # Arguments
    ///
    /// * `article` - The article to deliver
    async fn deliver(&self, article: &Article) -> OutputResult<()>;
}
