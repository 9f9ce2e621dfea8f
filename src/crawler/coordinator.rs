//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the round loop that coordinates a crawl run:
//! - Snapshotting the frontier into one batch per BFS level
//! - Dispatching the batch across a bounded worker pool
//! - Fetching, scraping and assembling each page in a worker
//! - Emitting articles as soon as they are assembled
//! - Waiting for the whole batch before starting the next round

use crate::article::Article;
use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetch;
use crate::crawler::frontier::{Frontier, FrontierItem};
use crate::crawler::parser::Page;
use crate::url::CanonicalUrl;
use crate::{CrawlError, ScrapeError};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

/// Limits of a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Related-link hops allowed from a seed
    pub max_depth: u32,

    /// Maximum number of pages fetched concurrently
    pub worker_pool_size: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: 5,
            worker_pool_size: 32,
        }
    }
}

impl CrawlSettings {
    /// Builds settings from the `[crawler]` config section
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            worker_pool_size: config.worker_pool_size as usize,
        }
    }
}

/// Counters for a finished crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Rounds dispatched (BFS levels visited)
    pub rounds: u32,

    /// Articles emitted
    pub articles: u64,

    /// Pages fetched but missing a required field
    pub structural_failures: u64,

    /// Pages that could not be fetched
    pub transport_failures: u64,

    /// Worker tasks that panicked or were cancelled
    pub worker_failures: u64,
}

/// Crawls a site breadth-first from seed pages
///
/// A `Crawler` holds no per-run state: every call to [`Crawler::crawl`]
/// starts from a fresh frontier and visited set.
pub struct Crawler<F> {
    fetcher: Arc<F>,
    settings: CrawlSettings,
}

impl<F: Fetch + 'static> Crawler<F> {
    /// Creates a crawler over a page source
    pub fn new(fetcher: F, settings: CrawlSettings) -> Self {
        Self::with_shared(Arc::new(fetcher), settings)
    }

    /// Creates a crawler over a page source shared with other users
    pub fn with_shared(fetcher: Arc<F>, settings: CrawlSettings) -> Self {
        Self { fetcher, settings }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Starts a crawl run from `seeds`
    ///
    /// The run executes in a background task on the current Tokio runtime
    /// and must therefore be called from within one. Articles are available
    /// from the returned stream as soon as they are assembled; the stream
    /// ends when the frontier is exhausted.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rabbit_crawler::{canonicalize, CrawlSettings, Crawler, HttpFetcher, RetryPolicy};
    /// use rabbit_crawler::crawler::build_http_client;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let policy = RetryPolicy::default();
    /// let client = build_http_client("rabbit-crawler/1.0", &policy)?;
    /// let crawler = Crawler::new(HttpFetcher::new(client, policy), CrawlSettings::default());
    ///
    /// let mut articles = crawler.crawl(vec![canonicalize("https://www.bbc.co.uk/news/uk")]);
    /// while let Some(article) = articles.next().await {
    ///     println!("{}", article.title());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn crawl(&self, seeds: impl IntoIterator<Item = CanonicalUrl>) -> ArticleStream {
        let pool_size = self.settings.worker_pool_size.max(1);
        let (tx, rx) = mpsc::channel(pool_size);

        let run = CrawlRun {
            fetcher: self.fetcher.clone(),
            frontier: Arc::new(Frontier::new(seeds, self.settings.max_depth)),
            workers: Arc::new(Semaphore::new(pool_size)),
            tx,
        };

        ArticleStream {
            rx,
            handle: Some(tokio::spawn(run.run())),
            stats: None,
        }
    }
}

/// Articles produced by one crawl run, in the order they were assembled
///
/// The stream is finite and cannot be restarted. Dropping it stops the run
/// once the round in progress has finished.
pub struct ArticleStream {
    rx: mpsc::Receiver<Article>,
    handle: Option<JoinHandle<RunStats>>,
    stats: Option<RunStats>,
}

impl ArticleStream {
    /// Waits for the next article, or `None` once the run has ended
    pub async fn next(&mut self) -> Option<Article> {
        match self.rx.recv().await {
            Some(article) => Some(article),
            None => {
                self.finish().await;
                None
            }
        }
    }

    /// Drains the stream into a vector
    pub async fn collect_all(mut self) -> Vec<Article> {
        let mut articles = Vec::new();
        while let Some(article) = self.next().await {
            articles.push(article);
        }
        articles
    }

    /// Counters of the run, available once the stream has ended
    pub fn stats(&self) -> Option<&RunStats> {
        self.stats.as_ref()
    }

    async fn finish(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        match handle.await {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => tracing::error!("Crawl run task failed: {}", e),
        }
    }
}

/// State shared by the tasks of one crawl run
struct CrawlRun<F> {
    fetcher: Arc<F>,
    frontier: Arc<Frontier>,
    workers: Arc<Semaphore>,
    tx: mpsc::Sender<Article>,
}

impl<F: Fetch + 'static> CrawlRun<F> {
    /// Runs rounds until a round's batch is empty
    async fn run(self) -> RunStats {
        let mut stats = RunStats::default();
        let start_time = std::time::Instant::now();

        loop {
            let batch = self.frontier.take_round();
            if batch.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            if self.tx.is_closed() {
                tracing::info!("Article stream dropped, stopping crawl");
                break;
            }

            stats.rounds += 1;
            tracing::info!(
                "Round {}: dispatching {} URLs (depth {})",
                stats.rounds,
                batch.len(),
                batch[0].depth
            );

            self.run_round(batch, &mut stats).await;

            tracing::info!(
                "Round {} complete: {} articles so far, {} URLs queued",
                stats.rounds,
                stats.articles,
                self.frontier.pending()
            );
        }

        tracing::info!(
            "Crawl finished: {} articles in {} rounds ({:?}); {} not articles, {} unreachable, {} worker failures",
            stats.articles,
            stats.rounds,
            start_time.elapsed(),
            stats.structural_failures,
            stats.transport_failures,
            stats.worker_failures
        );

        stats
    }

    /// Processes one batch and waits for every item in it
    async fn run_round(&self, batch: Vec<FrontierItem>, stats: &mut RunStats) {
        let mut tasks = JoinSet::new();

        for item in batch {
            let fetcher = self.fetcher.clone();
            let frontier = self.frontier.clone();
            let workers = self.workers.clone();
            let tx = self.tx.clone();

            tasks.spawn(async move {
                let result = match workers.acquire_owned().await {
                    Ok(_permit) => process_item(fetcher.as_ref(), &frontier, &tx, &item).await,
                    Err(e) => Err(CrawlError::Worker(e.to_string())),
                };
                (item, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((item, Ok(None))) => {
                    tracing::debug!(
                        "Dropped {} (depth {}): article stream closed",
                        item.url,
                        item.depth
                    );
                }
                Ok((item, Ok(Some(queued)))) => {
                    stats.articles += 1;
                    tracing::info!(
                        "Scraped {} (depth {}), {} related URLs queued",
                        item.url,
                        item.depth,
                        queued
                    );
                }
                Ok((item, Err(e))) if e.is_structural() => {
                    stats.structural_failures += 1;
                    tracing::info!("Skipped {} (depth {}): {}", item.url, item.depth, e);
                }
                Ok((item, Err(e))) => {
                    match e {
                        CrawlError::Fetch(_) => stats.transport_failures += 1,
                        _ => stats.worker_failures += 1,
                    }
                    tracing::error!("Failed {} (depth {}): {}", item.url, item.depth, e);
                }
                Err(e) => {
                    stats.worker_failures += 1;
                    tracing::error!("Crawl worker failed: {}", e);
                }
            }
        }
    }
}

/// Fetches, scrapes and emits a single frontier item
///
/// # Returns
///
/// * `Ok(Some(usize))` - The article was emitted; the number of related URLs queued
/// * `Ok(None)` - The article was assembled but the stream had been dropped
/// * `Err(CrawlError)` - The item was dropped
async fn process_item<F: Fetch + ?Sized>(
    fetcher: &F,
    frontier: &Frontier,
    tx: &mpsc::Sender<Article>,
    item: &FrontierItem,
) -> Result<Option<usize>, CrawlError> {
    let body = fetcher.fetch(&item.url.to_string()).await?;
    let article = scrape(&item.url, &body)?;
    let related = article.related_urls().to_vec();

    if tx.send(article).await.is_err() {
        return Ok(None);
    }

    Ok(Some(frontier.discover(item, &related)))
}

/// Parses a page body and assembles its article
fn scrape(url: &CanonicalUrl, body: &str) -> Result<Article, ScrapeError> {
    let page = Page::parse(body, url.clone());
    Article::assemble(&page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;
    use crate::FetchError;
    use async_trait::async_trait;

    /// Serves the same body for every URL
    struct StaticPage(&'static str);

    #[async_trait]
    impl Fetch for StaticPage {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            Ok(self.0.to_string())
        }
    }

    const PAGE: &str = r#"<html>
        <head><meta property="article:section" content="UK"></head>
        <body>
            <h1>Title</h1>
            <time datetime="2021-03-04T10:00:00Z"></time>
            <article><div data-component="text-block">Body</div></article>
            <a href="/news/next-200">Next</a>
        </body>
        </html>"#;

    fn seed_item() -> FrontierItem {
        FrontierItem {
            url: canonicalize("https://site.example/news/a-100"),
            depth: 0,
        }
    }

    #[tokio::test]
    async fn test_process_item_emits_then_queues_links() {
        let frontier = Frontier::new(Vec::<CanonicalUrl>::new(), 5);
        let (tx, mut rx) = mpsc::channel(1);

        let outcome = process_item(&StaticPage(PAGE), &frontier, &tx, &seed_item())
            .await
            .unwrap();

        assert_eq!(outcome, Some(1));
        assert_eq!(rx.recv().await.unwrap().title(), "Title");
        assert_eq!(frontier.pending(), 1);
    }

    #[tokio::test]
    async fn test_process_item_with_closed_stream() {
        let frontier = Frontier::new(Vec::<CanonicalUrl>::new(), 5);
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let outcome = process_item(&StaticPage(PAGE), &frontier, &tx, &seed_item())
            .await
            .unwrap();

        assert_eq!(outcome, None);
        assert_eq!(frontier.pending(), 0);
    }

    #[tokio::test]
    async fn test_round_does_not_count_undelivered_articles() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let run = CrawlRun {
            fetcher: Arc::new(StaticPage(PAGE)),
            frontier: Arc::new(Frontier::new(Vec::<CanonicalUrl>::new(), 5)),
            workers: Arc::new(Semaphore::new(2)),
            tx,
        };

        let mut stats = RunStats::default();
        run.run_round(vec![seed_item()], &mut stats).await;

        assert_eq!(stats, RunStats::default());
    }
}
