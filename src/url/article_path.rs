use crate::url::CanonicalUrl;
use regex::Regex;
use std::sync::OnceLock;

/// Section prefix followed by a hyphenated slug ending in a numeric id
const ARTICLE_PATH_PATTERN: &str = r"^/news/.+-\d+.";

fn article_path_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(ARTICLE_PATH_PATTERN).expect("article path pattern is valid"))
}

/// Checks whether a URL looks like a news article rather than a section page
///
/// Article pages live under `/news/` and carry a numeric id in their slug,
/// e.g. `/news/uk-politics-58403571`. Section pages such as `/news/uk` do not.
///
/// # Examples
///
/// ```
/// use rabbit_crawler::url::{canonicalize, is_news_article};
///
/// assert!(is_news_article(&canonicalize("https://site.example/news/story-12345")));
/// assert!(!is_news_article(&canonicalize("https://site.example/news/uk")));
/// ```
pub fn is_news_article(url: &CanonicalUrl) -> bool {
    article_path_regex().is_match(url.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    fn check(url: &str) -> bool {
        is_news_article(&canonicalize(url))
    }

    #[test]
    fn test_article_path() {
        assert!(check("https://www.bbc.co.uk/news/uk-politics-58403571"));
        assert!(check("https://site.example/news/story-12345"));
    }

    #[test]
    fn test_section_page() {
        assert!(!check("https://www.bbc.co.uk/news/uk"));
        assert!(!check("https://www.bbc.co.uk/news/science_and_environment"));
    }

    #[test]
    fn test_outside_news_prefix() {
        assert!(!check("https://site.example/about"));
        assert!(!check("https://site.example/sport/football-12345"));
    }

    #[test]
    fn test_id_needs_more_than_one_digit() {
        assert!(!check("https://site.example/news/story-1"));
        assert!(check("https://site.example/news/story-12"));
    }

    #[test]
    fn test_nested_article_path() {
        assert!(check("https://site.example/news/world/europe-1234"));
    }
}
