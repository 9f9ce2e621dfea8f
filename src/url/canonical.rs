use std::fmt;
use url::Url;

/// Hosts that serve the same content as another, canonical host
const HOST_ALIASES: &[(&str, &str)] = &[("www.bbc.com", "www.bbc.co.uk")];

/// A normalized URL used as the dedup key for the crawl
///
/// Only scheme, host and path survive canonicalization; query strings and
/// fragments are dropped. Two equal `CanonicalUrl`s always refer to the same
/// page as far as the crawler is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl {
    scheme: String,
    host: String,
    path: String,
}

impl CanonicalUrl {
    /// The URL scheme (`https` for anything that started as `http`)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host, including a `:port` suffix for non-default ports
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The path without trailing slashes (may be empty)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if canonicalization could not make sense of the input
    pub fn is_empty(&self) -> bool {
        self.scheme.is_empty() && self.host.is_empty() && self.path.is_empty()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.scheme.is_empty(), self.host.is_empty()) {
            (_, false) => write!(f, "{}://{}{}", self.scheme, self.host, self.path),
            // Host-less URLs such as mailto: keep their opaque form
            (false, true) => write!(f, "{}:{}", self.scheme, self.path),
            (true, true) => f.write_str(&self.path),
        }
    }
}

/// Canonicalizes a URL according to the crawler's dedup rules
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; malformed input yields an empty `CanonicalUrl`
/// 2. Upgrade `http` to `https` (other schemes pass through)
/// 3. Rewrite aliased hosts to their canonical host
/// 4. Strip trailing slashes from the path
/// 5. Drop query and fragment
///
/// This never fails: it normalizes, it does not validate reachability.
///
/// # Examples
///
/// ```
/// use rabbit_crawler::url::canonicalize;
///
/// let url = canonicalize("http://www.bbc.com/news/uk/?at_medium=RSS");
/// assert_eq!(url.to_string(), "https://www.bbc.co.uk/news/uk");
/// ```
pub fn canonicalize(raw: &str) -> CanonicalUrl {
    match Url::parse(raw.trim()) {
        Ok(url) => from_url(&url),
        Err(e) => {
            tracing::trace!("Cannot parse {:?} as a URL: {}", raw, e);
            CanonicalUrl::default()
        }
    }
}

/// Resolves an href found on `base` and canonicalizes the result
///
/// Relative hrefs (`/news/x`, `x`, `//host/x`) are resolved against the page
/// they were found on; absolute hrefs are canonicalized as they are. The base
/// is the canonical URL, which is also the URL the page was requested with.
/// It has no trailing slash, so `x` on `/news/world/` resolves to `/news/x`.
pub fn canonicalize_href(base: &CanonicalUrl, href: &str) -> CanonicalUrl {
    let href = href.trim();

    if let Ok(url) = Url::parse(href) {
        return from_url(&url);
    }

    match Url::parse(&base.to_string()).and_then(|base| base.join(href)) {
        Ok(url) => from_url(&url),
        Err(e) => {
            tracing::trace!("Cannot resolve {:?} against {}: {}", href, base, e);
            CanonicalUrl::default()
        }
    }
}

fn from_url(url: &Url) -> CanonicalUrl {
    let scheme = match url.scheme() {
        "http" => "https".to_string(),
        other => other.to_string(),
    };

    let host = match url.host_str() {
        Some(host) => {
            let host = host.to_lowercase();
            let host = resolve_alias(&host).unwrap_or(host);
            match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            }
        }
        None => String::new(),
    };

    let path = url.path().trim_end_matches('/').to_string();

    CanonicalUrl { scheme, host, path }
}

fn resolve_alias(host: &str) -> Option<String> {
    HOST_ALIASES
        .iter()
        .find(|(alias, _)| *alias == host)
        .map(|(_, canonical)| canonical.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_to_https() {
        let result = canonicalize("http://example.com/page");
        assert_eq!(result.to_string(), "https://example.com/page");
        assert_eq!(result.scheme(), "https");
    }

    #[test]
    fn test_other_scheme_passes_through() {
        let result = canonicalize("ftp://example.com/file");
        assert_eq!(result.scheme(), "ftp");
    }

    #[test]
    fn test_host_alias() {
        let result = canonicalize("https://www.bbc.com/news/world-123");
        assert_eq!(result.host(), "www.bbc.co.uk");
        assert_eq!(result.to_string(), "https://www.bbc.co.uk/news/world-123");
    }

    #[test]
    fn test_remove_trailing_slash() {
        let result = canonicalize("https://example.com/page/");
        assert_eq!(result.path(), "/page");
    }

    #[test]
    fn test_root_path_becomes_empty() {
        let result = canonicalize("https://example.com/");
        assert_eq!(result.path(), "");
        assert_eq!(result.to_string(), "https://example.com");
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        let result = canonicalize("https://example.com/news/a-1?utm_source=x#top");
        assert_eq!(result.to_string(), "https://example.com/news/a-1");
    }

    #[test]
    fn test_port_kept() {
        let result = canonicalize("http://127.0.0.1:8080/news/");
        assert_eq!(result.host(), "127.0.0.1:8080");
    }

    #[test]
    fn test_lowercase_host() {
        let result = canonicalize("https://EXAMPLE.COM/Page");
        assert_eq!(result.to_string(), "https://example.com/Page");
    }

    #[test]
    fn test_malformed_url_is_empty() {
        let result = canonicalize("not a url");
        assert!(result.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "http://www.bbc.com/news/uk/",
            "https://example.com//a//",
            "https://example.com",
            "http://127.0.0.1:9000/x/?q=1",
            "mailto:someone@example.com",
            "not a url",
            "",
        ];

        for input in inputs {
            let once = canonicalize(input);
            let twice = canonicalize(&once.to_string());
            assert_eq!(once, twice, "canonicalize is not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_resolve_absolute_path_href() {
        let base = canonicalize("https://www.bbc.co.uk/news/uk");
        let result = canonicalize_href(&base, "/news/business-123/");
        assert_eq!(result.to_string(), "https://www.bbc.co.uk/news/business-123");
    }

    #[test]
    fn test_resolve_relative_href() {
        let base = canonicalize("https://example.com/news/uk");
        let result = canonicalize_href(&base, "world-42");
        assert_eq!(result.to_string(), "https://example.com/news/world-42");
    }

    #[test]
    fn test_resolve_protocol_relative_href() {
        let base = canonicalize("https://example.com/news");
        let result = canonicalize_href(&base, "//www.bbc.com/news/a-1");
        assert_eq!(result.to_string(), "https://www.bbc.co.uk/news/a-1");
    }

    #[test]
    fn test_absolute_href_ignores_base() {
        let base = canonicalize("https://example.com/news");
        let result = canonicalize_href(&base, "http://other.example/about/");
        assert_eq!(result.to_string(), "https://other.example/about");
    }
}
