//! Crawl frontier for level-by-level BFS
//!
//! This module handles:
//! - The set of URLs already enqueued during a run (the visited set)
//! - Collecting URLs discovered during a round for the next round
//! - Enforcing the depth budget when links are discovered
//!
//! Between rounds the frontier is drained into an owned snapshot. While a
//! round runs, workers only ever append to the next round, so depth never
//! decreases from one round to the next.

use crate::url::CanonicalUrl;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// A URL waiting to be crawled, with its distance from the seeds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontierItem {
    /// The URL to fetch
    pub url: CanonicalUrl,

    /// Number of related-link hops from a seed
    pub depth: u32,
}

/// URLs enqueued at least once during a run
///
/// A URL is added at the moment it is first enqueued, not when it is
/// fetched, so two workers discovering the same link only enqueue it once.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<CanonicalUrl>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically inserts `url`, returning true if it was not present
    pub fn insert(&self, url: &CanonicalUrl) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone())
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The BFS frontier of one crawl run
#[derive(Debug)]
pub struct Frontier {
    visited: VisitedSet,
    next_round: Mutex<Vec<FrontierItem>>,
    max_depth: u32,
}

impl Frontier {
    /// Creates a frontier holding `seeds` at depth 0
    ///
    /// Duplicate and empty seeds are dropped.
    pub fn new(seeds: impl IntoIterator<Item = CanonicalUrl>, max_depth: u32) -> Self {
        let frontier = Self {
            visited: VisitedSet::new(),
            next_round: Mutex::new(Vec::new()),
            max_depth,
        };

        for url in seeds {
            if url.is_empty() {
                tracing::warn!("Ignoring empty seed URL");
                continue;
            }
            frontier.enqueue(FrontierItem { url, depth: 0 });
        }

        frontier
    }

    /// Takes every pending item, leaving the frontier empty
    ///
    /// The returned batch is the next round; anything discovered while it
    /// runs lands in the round after.
    pub fn take_round(&self) -> Vec<FrontierItem> {
        let mut next_round = self
            .next_round
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *next_round)
    }

    /// Enqueues the related links of a page crawled at `parent.depth`
    ///
    /// Links are only enqueued when the parent is below the depth budget and
    /// the link has never been enqueued before in this run.
    ///
    /// # Returns
    ///
    /// The number of links newly enqueued
    pub fn discover(&self, parent: &FrontierItem, links: &[CanonicalUrl]) -> usize {
        if parent.depth >= self.max_depth {
            return 0;
        }

        let depth = parent.depth + 1;
        links
            .iter()
            .filter(|url| {
                self.enqueue(FrontierItem {
                    url: (*url).clone(),
                    depth,
                })
            })
            .inspect(|url| tracing::debug!("Discovered {} (depth {})", url, depth))
            .count()
    }

    /// Number of items waiting for the next round
    pub fn pending(&self) -> usize {
        self.next_round
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// URLs enqueued so far in this run
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn enqueue(&self, item: FrontierItem) -> bool {
        if !self.visited.insert(&item.url) {
            return false;
        }

        self.next_round
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
        true
    }
}
