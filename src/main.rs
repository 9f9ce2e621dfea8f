//! Rabbit crawler main entry point
//!
//! This is the command-line interface: it crawls the configured news
//! sections and delivers every article to the ingestion endpoint (or prints
//! them as JSON lines).

use anyhow::Context;
use clap::Parser;
use rabbit_crawler::config::{load_config_with_hash, validate, Config, IngestConfig};
use rabbit_crawler::crawler::{crawler_from_config, seeds_from_config};
use rabbit_crawler::output::{ArticleSink, IngestSink, JsonLinesSink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding `ingest.endpoint`
const ENDPOINT_ENV: &str = "RABBIT_WEB_URL";

/// Environment variable overriding `ingest.api-key`
const API_KEY_ENV: &str = "RABBIT_API_KEY";

/// Rabbit crawler: follows related links between news articles
///
/// Starting from a set of section pages, the crawler scrapes every article
/// reachable through related links within the depth budget and delivers
/// each one as a JSON record.
#[derive(Parser, Debug)]
#[command(name = "rabbit-crawler")]
#[command(version)]
#[command(about = "Crawls news sections and delivers articles", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print articles as JSON lines instead of posting them
    #[arg(long)]
    stdout: bool,

    /// Start a new crawl as soon as one finishes, forever
    #[arg(long = "loop", conflicts_with = "dry_run")]
    repeat: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(&mut config);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        print_dry_run(&config, cli.stdout);
        return Ok(());
    }

    let sink = build_sink(&config, cli.stdout)?;

    loop {
        run_once(&config, sink.as_ref()).await?;
        if !cli.repeat {
            break;
        }
        tracing::info!("Starting next crawl");
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rabbit_crawler=info,warn"),
            1 => EnvFilter::new("rabbit_crawler=debug,info"),
            2 => EnvFilter::new("rabbit_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so that --stdout output stays clean JSON lines
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies `RABBIT_WEB_URL` / `RABBIT_API_KEY` on top of the file config
fn apply_env_overrides(config: &mut Config) {
    apply_ingest_overrides(
        config,
        std::env::var(ENDPOINT_ENV).ok(),
        std::env::var(API_KEY_ENV).ok(),
    );
}

/// Overrides the `[ingest]` section, creating it when only an endpoint is given
fn apply_ingest_overrides(config: &mut Config, endpoint: Option<String>, api_key: Option<String>) {
    if let Some(endpoint) = endpoint {
        match config.ingest.as_mut() {
            Some(ingest) => ingest.endpoint = endpoint,
            None => {
                config.ingest = Some(IngestConfig {
                    endpoint,
                    api_key: None,
                })
            }
        }
    }

    if let Some(key) = api_key {
        match config.ingest.as_mut() {
            Some(ingest) => ingest.api_key = Some(key),
            None => tracing::warn!(
                "{} is set but no ingest endpoint is configured (set [ingest] or {}), ignoring the key",
                API_KEY_ENV,
                ENDPOINT_ENV
            ),
        }
    }
}

/// Picks where articles go: the ingestion endpoint, or stdout
fn build_sink(config: &Config, stdout: bool) -> anyhow::Result<Box<dyn ArticleSink>> {
    if stdout {
        return Ok(Box::new(JsonLinesSink::stdout()));
    }

    match &config.ingest {
        Some(ingest) => {
            let client = reqwest::Client::builder()
                .user_agent(&config.fetch.user_agent)
                .build()
                .context("failed to build ingestion HTTP client")?;
            tracing::info!("Delivering articles to {}", ingest.endpoint);
            Ok(Box::new(IngestSink::from_config(client, ingest)))
        }
        None => {
            tracing::warn!(
                "No ingest endpoint configured (set [ingest] or {}), printing articles instead",
                ENDPOINT_ENV
            );
            Ok(Box::new(JsonLinesSink::stdout()))
        }
    }
}

/// Runs one complete crawl and delivers its articles
///
/// Delivery failures are logged; they never stop the crawl.
async fn run_once(config: &Config, sink: &dyn ArticleSink) -> anyhow::Result<()> {
    let crawler = crawler_from_config(config).context("failed to build HTTP client")?;
    let seeds = seeds_from_config(config);
    tracing::info!(
        "Crawling {} seed URLs (max depth {}, {} workers)",
        seeds.len(),
        crawler.settings().max_depth,
        crawler.settings().worker_pool_size
    );

    let mut articles = crawler.crawl(seeds);
    let mut delivered = 0u64;
    let mut failed = 0u64;

    while let Some(article) = articles.next().await {
        match sink.deliver(&article).await {
            Ok(()) => {
                delivered += 1;
                if let Ok(fingerprint) = article.fingerprint() {
                    tracing::debug!("Delivered {} (fingerprint {})", article.url(), fingerprint);
                }
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Failed to deliver {}: {}", article.url(), e);
            }
        }
    }

    if let Some(stats) = articles.stats() {
        tracing::info!(
            "Run finished after {} rounds: {} articles delivered, {} delivery failures",
            stats.rounds,
            delivered,
            failed
        );
    }

    Ok(())
}

/// Handles the --dry-run mode: shows what would be crawled
fn print_dry_run(config: &Config, stdout: bool) {
    println!("=== Rabbit Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Worker pool size: {}", config.crawler.worker_pool_size);

    println!("\nFetch:");
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!(
        "  Backoff: {}ms x{}",
        config.fetch.backoff_base_ms, config.fetch.backoff_factor
    );
    println!("  Attempt timeout: {}ms", config.fetch.attempt_timeout_ms);
    println!("  User agent: {}", config.fetch.user_agent);

    println!("\nOutput:");
    match (&config.ingest, stdout) {
        (_, true) | (None, false) => println!("  JSON lines on stdout"),
        (Some(ingest), false) => {
            println!("  POST {}", ingest.endpoint);
            println!(
                "  API key: {}",
                if ingest.api_key.is_some() { "set" } else { "not set" }
            );
        }
    }

    let seeds = seeds_from_config(config);
    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_ingest() -> Config {
        Config {
            ingest: Some(IngestConfig {
                endpoint: "https://ingest.example/articles".to_string(),
                api_key: Some("file-key".to_string()),
            }),
            ..Config::default()
        }
    }

    #[test]
    fn test_no_overrides_keeps_file_config() {
        let mut config = config_with_ingest();
        apply_ingest_overrides(&mut config, None, None);

        let ingest = config.ingest.unwrap();
        assert_eq!(ingest.endpoint, "https://ingest.example/articles");
        assert_eq!(ingest.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = config_with_ingest();
        apply_ingest_overrides(
            &mut config,
            Some("https://other.example/in".to_string()),
            Some("env-key".to_string()),
        );

        let ingest = config.ingest.unwrap();
        assert_eq!(ingest.endpoint, "https://other.example/in");
        assert_eq!(ingest.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_endpoint_override_creates_ingest_section() {
        let mut config = Config::default();
        apply_ingest_overrides(
            &mut config,
            Some("https://ingest.example/articles".to_string()),
            Some("env-key".to_string()),
        );

        assert!(validate(&config).is_ok());
        let ingest = config.ingest.unwrap();
        assert_eq!(ingest.endpoint, "https://ingest.example/articles");
        assert_eq!(ingest.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_api_key_without_endpoint_is_ignored() {
        let mut config = Config::default();
        apply_ingest_overrides(&mut config, None, Some("env-key".to_string()));

        assert!(config.ingest.is_none());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["rabbit-crawler", "rabbit.toml", "--stdout", "-vv"]);
        assert_eq!(cli.config, Some(PathBuf::from("rabbit.toml")));
        assert!(cli.stdout);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.repeat);

        assert!(Cli::try_parse_from(["rabbit-crawler", "--loop", "--dry-run"]).is_err());
    }
}
