//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - An explicit retry policy with exponential backoff
//! - A per-attempt timeout so total retry time stays bounded
//! - Error classification (retryable vs. final)

use crate::config::FetchConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Retry policy for page fetches
///
/// Attempt `n` (1-based) that fails with a retryable error is followed by a
/// sleep of `base_delay * factor^(n-1)` before attempt `n+1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    pub base_delay: Duration,

    /// Multiplier applied to the delay after every further failure
    pub factor: u32,

    /// Upper bound on a single attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            factor: 2,
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from the `[fetch]` config section
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.backoff_base_ms),
            factor: config.backoff_factor,
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
        }
    }

    /// Returns the delay to wait after failed attempt number `attempt`
    ///
    /// # Examples
    ///
    /// ```
    /// use rabbit_crawler::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_for(1), Duration::from_secs(1));
    /// assert_eq!(policy.delay_for(4), Duration::from_secs(8));
    /// ```
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        self.base_delay
            .saturating_mul(self.factor.saturating_pow(exponent))
    }
}

/// Runs `op` under `policy` until it succeeds, fails for good, or runs out of attempts
///
/// # Retry Logic
///
/// | Outcome of an attempt | Action |
/// |-----------------------|--------|
/// | Success | Return the value |
/// | Non-retryable error (e.g. HTTP 404) | Return it immediately |
/// | Retryable error, attempts left | Sleep `delay_for(attempt)`, try again |
/// | Retryable error, no attempts left | `FetchError::RetriesExhausted` |
///
/// Each attempt is cut off after `policy.attempt_timeout` and counts as a
/// retryable `FetchError::Timeout`.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, url: &str, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 1;

    loop {
        let outcome = match tokio::time::timeout(policy.attempt_timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                attempt,
            }),
        };

        let error = match outcome {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !error.is_retryable() {
            return Err(error);
        }

        if attempt >= policy.max_attempts {
            return Err(FetchError::RetriesExhausted {
                url: url.to_string(),
                attempts: attempt,
                last: Box::new(error),
            });
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            "Attempt {}/{} for {} failed: {}; retrying in {:?}",
            attempt,
            policy.max_attempts,
            url,
            error,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// A source of page bodies
///
/// The crawler only depends on this trait, so it can run against the network
/// ([`HttpFetcher`]) or any other page source.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url` and returns its body decoded as text
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches pages over HTTP with retries
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    /// Creates a fetcher from an existing client and a retry policy
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds a fetcher from the `[fetch]` config section
    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let policy = RetryPolicy::from_config(config);
        let client = build_http_client(&config.user_agent, &policy)?;
        Ok(Self::new(client, policy))
    }

    /// The retry policy applied to every fetch
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        retry(&self.policy, url, || fetch_once(&self.client, url)).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// The overall request timeout is left to the retry policy; the connect
/// timeout is capped at the attempt timeout.
///
/// # Example
///
/// ```no_run
/// use rabbit_crawler::crawler::build_http_client;
/// use rabbit_crawler::RetryPolicy;
///
/// let client = build_http_client("rabbit-crawler/1.0", &RetryPolicy::default()).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, policy: &RetryPolicy) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(policy.attempt_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs a single GET and decodes the body as UTF-8
///
/// The declared charset is ignored; invalid sequences become U+FFFD.
async fn fetch_once(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
