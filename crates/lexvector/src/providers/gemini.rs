//! Gemini embedding client for the Generative Language API
//!
//! One text unit per request; rate-limit aware with a configurable retry
//! policy (429/5xx, honoring `Retry-After` when the provider sends it).

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;

/// Embedding client for Gemini `text-embedding-004` style models
pub struct GeminiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl GeminiEmbedder {
    /// Create a new embedder from the embedding configuration section
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Get the API endpoint URL for the configured model
    fn embed_url(&self) -> String {
        format!("{}/models/{}:embedContent", self.endpoint, self.model)
    }

    async fn request_once(&self, text: &str) -> Result<EmbedOutcome> {
        let request = EmbedRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(self.embed_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            return Ok(EmbedOutcome::Failed {
                status,
                body,
                retry_after,
            });
        }

        // Keep the raw body so a structurally unexpected reply can be
        // reported verbatim.
        let body = response.text().await?;
        let parsed: EmbedResponse = serde_json::from_str(&body)
            .map_err(|_| Error::embedding(status.to_string(), body.clone()))?;

        match parsed.embedding {
            Some(embedding) if !embedding.values.is_empty() => {
                Ok(EmbedOutcome::Success(embedding.values))
            }
            _ => Err(Error::embedding(status.to_string(), body)),
        }
    }
}

enum EmbedOutcome {
    Success(Vec<f32>),
    Failed {
        status: StatusCode,
        body: String,
        retry_after: Option<Duration>,
    },
}

fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[derive(serde::Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(serde::Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embedding: Option<EmbeddingValues>,
}

#[derive(serde::Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut attempt = 0u32;
        loop {
            match self.request_once(text).await? {
                EmbedOutcome::Success(values) => return Ok(values),
                EmbedOutcome::Failed {
                    status,
                    body,
                    retry_after,
                } => {
                    if attempt >= self.max_retries || !is_retryable(status) {
                        return Err(Error::embedding(status.to_string(), body));
                    }
                    let delay = retry_after
                        .unwrap_or_else(|| Duration::from_millis(500 * 2u64.pow(attempt)));
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Embedding request throttled, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
