use crate::article::Article;
use crate::config::IngestConfig;
use crate::output::ArticleSink;
use crate::{OutputError, OutputResult};
use async_trait::async_trait;
use reqwest::Client;

/// Header carrying the ingestion API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Posts article records to the ingestion endpoint
#[derive(Debug, Clone)]
pub struct IngestSink {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl IngestSink {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Builds a sink from the `[ingest]` config section
    pub fn from_config(client: Client, config: &IngestConfig) -> Self {
        Self::new(client, config.endpoint.clone(), config.api_key.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ArticleSink for IngestSink {
    async fn deliver(&self, article: &Article) -> OutputResult<()> {
        let mut request = self.client.post(&self.endpoint).json(&article.record());
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|source| OutputError::Http {
            url: self.endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OutputError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!("Delivered {} to {}", article.url(), self.endpoint);
        Ok(())
    }
}
