//! URL handling module
//!
//! This module provides URL canonicalization (the crawl's dedup key),
//! href resolution, and the heuristic that tells article pages apart from
//! section and navigation pages.

mod article_path;
mod canonical;

// Re-export main functions
pub use article_path::is_news_article;
pub use canonical::{canonicalize, canonicalize_href, CanonicalUrl};

/// Returns true if `link` is on the same host as `page`
///
/// Cross-host links are never followed, which keeps a crawl on its site.
pub fn same_host(page: &CanonicalUrl, link: &CanonicalUrl) -> bool {
    !page.host().is_empty() && page.host() == link.host()
}

/// Returns true if `link` should be crawled as a related article of `page`
pub fn is_related(page: &CanonicalUrl, link: &CanonicalUrl) -> bool {
    same_host(page, link) && is_news_article(link)
}
