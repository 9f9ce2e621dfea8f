use crate::config::types::{Config, CrawlerConfig, FetchConfig, IngestConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent fetches per round
const MAX_WORKER_POOL_SIZE: u32 = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    if let Some(ingest) = &config.ingest {
        validate_ingest_config(ingest)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.worker_pool_size < 1 || config.worker_pool_size > MAX_WORKER_POOL_SIZE {
        return Err(ConfigError::Validation(format!(
            "worker-pool-size must be between 1 and {}, got {}",
            MAX_WORKER_POOL_SIZE, config.worker_pool_size
        )));
    }

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_http_url(seed, "seed URL")?;
    }

    Ok(())
}

/// Validates fetch and retry configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.backoff_base_ms < 1 {
        return Err(ConfigError::Validation(
            "backoff-base-ms must be >= 1".to_string(),
        ));
    }

    if config.backoff_factor < 1 {
        return Err(ConfigError::Validation(format!(
            "backoff-factor must be >= 1, got {}",
            config.backoff_factor
        )));
    }

    if config.attempt_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "attempt-timeout-ms must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the ingestion endpoint
fn validate_ingest_config(config: &IngestConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.endpoint, "ingest endpoint")?;

    if let Some(key) = &config.api_key {
        if key.is_empty() {
            return Err(ConfigError::Validation(
                "api-key cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Checks that `value` parses as an http(s) URL with a host
fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            what, value
        )));
    }

    Ok(())
}
