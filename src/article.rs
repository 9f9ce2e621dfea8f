//! Article records
//!
//! An [`Article`] only exists if its page had every required field; there is
//! no partially populated article. The JSON form sent downstream is
//! [`ArticleRecord`].

use crate::crawler::Page;
use crate::url::CanonicalUrl;
use crate::ScrapeError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A scraped news article
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    url: CanonicalUrl,
    title: String,
    date_published: DateTime<FixedOffset>,
    category: String,
    paragraphs: Vec<String>,
    related_urls: Vec<CanonicalUrl>,
}

/// The JSON object delivered to the ingestion endpoint
///
/// ```json
/// {"url": "...", "title": "...", "date_published": "2021-03-04T10:00:00+00:00",
///  "category": "...", "paragraphs": ["..."]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub title: String,
    /// RFC 3339 timestamp with its UTC offset
    pub date_published: String,
    pub category: String,
    pub paragraphs: Vec<String>,
}

impl Article {
    /// Assembles an article from a parsed page
    ///
    /// Fields are extracted in order: title, date, category, body, related
    /// links. The first required field that is missing ends assembly with its
    /// error, so a page without a heading is never inspected any further.
    /// An empty body is allowed.
    pub fn assemble(page: &Page) -> Result<Self, ScrapeError> {
        let title = page.title()?;
        let date_published = page.published_date()?;
        let category = page.category()?;
        let paragraphs = page.body_paragraphs();
        let related_urls = page.related_links();

        Ok(Self {
            url: page.url().clone(),
            title,
            date_published,
            category,
            paragraphs,
            related_urls,
        })
    }

    pub fn url(&self) -> &CanonicalUrl {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date_published(&self) -> DateTime<FixedOffset> {
        self.date_published
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Same-host article links found on the page, in document order
    pub fn related_urls(&self) -> &[CanonicalUrl] {
        &self.related_urls
    }

    /// Builds the downstream JSON record
    ///
    /// Related links are crawl bookkeeping and are not part of the record.
    pub fn record(&self) -> ArticleRecord {
        ArticleRecord {
            url: self.url.to_string(),
            title: self.title.clone(),
            date_published: self.date_published.to_rfc3339(),
            category: self.category.clone(),
            paragraphs: self.paragraphs.clone(),
        }
    }

    /// Serializes the downstream JSON record
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.record())
    }

    /// Short content hash of the JSON record
    ///
    /// Two articles with the same fingerprint carry identical content. It is
    /// logged on delivery, so repeated deliveries across `--loop` runs can be
    /// matched up.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_json()?.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Ok(digest[..16].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    const ARTICLE_HTML: &str = r#"
        <html>
        <head><meta property="article:section" content="Technology"></head>
        <body>
            <h1>Robots learn to read</h1>
            <time datetime="2021-03-04T10:00:00.000Z">4 March 2021</time>
            <article>
                <div data-component="text-block">Paragraph one.</div>
                <div data-component="text-block">Paragraph two.</div>
            </article>
            <a href="/news/technology-56291234">Related</a>
            <a href="/news/technology">Section</a>
        </body>
        </html>
    "#;

    fn page(html: &str) -> Page {
        Page::parse(html, canonicalize("https://site.example/news/technology-56290001/"))
    }

    #[test]
    fn test_assemble_article() {
        let article = Article::assemble(&page(ARTICLE_HTML)).unwrap();

        assert_eq!(
            article.url().to_string(),
            "https://site.example/news/technology-56290001"
        );
        assert_eq!(article.title(), "Robots learn to read");
        assert_eq!(article.category(), "Technology");
        assert_eq!(article.paragraphs(), ["Paragraph one.", "Paragraph two."]);
        assert_eq!(article.related_urls().len(), 1);
        assert_eq!(
            article.related_urls()[0].to_string(),
            "https://site.example/news/technology-56291234"
        );
    }

    #[test]
    fn test_missing_title_short_circuits() {
        // Date is also unparseable, but the title error comes first
        let html = r#"<html><body><time datetime="garbage"></time></body></html>"#;
        assert_eq!(
            Article::assemble(&page(html)),
            Err(ScrapeError::MissingField("title"))
        );
    }

    #[test]
    fn test_missing_date() {
        let html = r#"<html><body><h1>Title</h1></body></html>"#;
        assert_eq!(
            Article::assemble(&page(html)),
            Err(ScrapeError::MissingField("date"))
        );
    }

    #[test]
    fn test_missing_category() {
        let html = r#"<html><body><h1>Title</h1><time datetime="2021-03-04T10:00:00Z"></time></body></html>"#;
        assert_eq!(
            Article::assemble(&page(html)),
            Err(ScrapeError::MissingField("category"))
        );
    }

    #[test]
    fn test_empty_body_is_allowed() {
        let html = r#"<html><head><meta property="article:section" content="UK"></head>
            <body><h1>Title</h1><time datetime="2021-03-04T10:00:00Z"></time></body></html>"#;
        let article = Article::assemble(&page(html)).unwrap();
        assert!(article.paragraphs().is_empty());
    }

    #[test]
    fn test_json_record() {
        let article = Article::assemble(&page(ARTICLE_HTML)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&article.to_json().unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "url": "https://site.example/news/technology-56290001",
                "title": "Robots learn to read",
                "date_published": "2021-03-04T10:00:00+00:00",
                "category": "Technology",
                "paragraphs": ["Paragraph one.", "Paragraph two."],
            })
        );
    }

    #[test]
    fn test_fingerprint() {
        let article = Article::assemble(&page(ARTICLE_HTML)).unwrap();
        let fingerprint = article.fingerprint().unwrap();

        assert_eq!(fingerprint.len(), 16);
        assert_eq!(fingerprint, article.clone().fingerprint().unwrap());

        let other = Article::assemble(&Page::parse(
            ARTICLE_HTML,
            canonicalize("https://site.example/news/technology-1111"),
        ))
        .unwrap();
        assert_ne!(fingerprint, other.fingerprint().unwrap());
    }
}
