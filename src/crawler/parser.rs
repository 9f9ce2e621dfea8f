//! HTML parser for extracting article fields and links
//!
//! A [`Page`] wraps a parsed document together with the canonical URL it was
//! fetched from. Each field is extracted by its own fallible call so that the
//! article assembler can decide which fields are required.

use crate::crawler::date::parse_date;
use crate::url::{canonicalize_href, is_related, CanonicalUrl};
use crate::ScrapeError;
use chrono::{DateTime, FixedOffset};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

/// CSS selectors for the fields of a news article page
struct Selectors {
    title: Selector,
    date: Selector,
    category: Selector,
    article: Selector,
    text_block: Selector,
    anchor: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        title: selector("h1"),
        date: selector("time[datetime]"),
        category: selector(r#"meta[property="article:section"]"#),
        article: selector("article"),
        text_block: selector(r#"div[data-component="text-block"]"#),
        anchor: selector("a[href]"),
    })
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("built-in selector is valid CSS")
}

/// Collects the text of an element, trimmed
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// A fetched page, parsed and ready for field extraction
pub struct Page {
    document: Html,
    url: CanonicalUrl,
}

impl Page {
    /// Parses `html` fetched from `url`
    ///
    /// Parsing itself never fails; malformed markup is recovered the way a
    /// browser would.
    ///
    /// # Example
    ///
    /// ```
    /// use rabbit_crawler::crawler::Page;
    /// use rabbit_crawler::url::canonicalize;
    ///
    /// let html = r#"<html><body><h1>Headline</h1></body></html>"#;
    /// let page = Page::parse(html, canonicalize("https://site.example/news/a-12"));
    /// assert_eq!(page.title().unwrap(), "Headline");
    /// ```
    pub fn parse(html: &str, url: CanonicalUrl) -> Self {
        Self {
            document: Html::parse_document(html),
            url,
        }
    }

    /// The canonical URL the page was fetched from
    pub fn url(&self) -> &CanonicalUrl {
        &self.url
    }

    /// Text of the first `<h1>`
    ///
    /// A heading with no text counts as missing.
    pub fn title(&self) -> Result<String, ScrapeError> {
        self.document
            .select(&selectors().title)
            .next()
            .map(element_text)
            .filter(|title| !title.is_empty())
            .ok_or(ScrapeError::MissingField("title"))
    }

    /// Raw `datetime` attribute of the first `<time datetime>` element
    pub fn raw_date(&self) -> Result<&str, ScrapeError> {
        self.document
            .select(&selectors().date)
            .next()
            .and_then(|element| element.value().attr("datetime"))
            .ok_or(ScrapeError::MissingField("date"))
    }

    /// Publish date, parsed from [`Page::raw_date`]
    pub fn published_date(&self) -> Result<DateTime<FixedOffset>, ScrapeError> {
        parse_date(self.raw_date()?)
    }

    /// Content of `<meta property="article:section">`
    pub fn category(&self) -> Result<String, ScrapeError> {
        self.document
            .select(&selectors().category)
            .next()
            .and_then(|element| element.value().attr("content"))
            .map(|content| content.trim().to_string())
            .ok_or(ScrapeError::MissingField("category"))
    }

    /// Text blocks of the `<article>` container, in document order
    ///
    /// Pages without an `<article>` are not articles; they yield no
    /// paragraphs rather than an error.
    pub fn body_paragraphs(&self) -> Vec<String> {
        let Some(article) = self.document.select(&selectors().article).next() else {
            return Vec::new();
        };

        article
            .select(&selectors().text_block)
            .map(element_text)
            .collect()
    }

    /// Every `<a href>` on the page, resolved and canonicalized
    ///
    /// Query strings and fragments are dropped; hrefs that cannot be made
    /// sense of are skipped.
    pub fn links(&self) -> Vec<CanonicalUrl> {
        self.document
            .select(&selectors().anchor)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| canonicalize_href(&self.url, href))
            .filter(|link| !link.is_empty())
            .collect()
    }

    /// Links to other articles on the same host, without duplicates
    pub fn related_links(&self) -> Vec<CanonicalUrl> {
        let mut seen = HashSet::new();

        self.links()
            .into_iter()
            .filter(|link| is_related(&self.url, link))
            .filter(|link| seen.insert(link.clone()))
            .collect()
    }
}
