use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

use super::{backoff, build_client, is_retryable, NlpError, MAX_RETRIES};
use crate::config::EmbeddingConfig;

/// OpenAI-compatible `/embeddings` client.
#[derive(Clone)]
pub struct EmbeddingClient {
    config: EmbeddingConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(config: EmbeddingConfig) -> Self {
        let client = build_client(config.timeout);
        Self { config, client }
    }

    pub fn is_available(&self) -> bool {
        self.config.is_available()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn embed_texts(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, NlpError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(NlpError::NotConfigured("EMBEDDING_API_KEY"))?;

        let url = format!("{}/embeddings", self.config.api_endpoint.trim_end_matches('/'));
        let payload = EmbeddingRequest {
            model: &self.config.model,
            input: inputs,
        };

        let resp = self.post_with_retry(&url, api_key, &payload).await?;
        if resp.data.is_empty() {
            return Err(NlpError::Empty("embedding endpoint"));
        }
        if resp.data.len() != inputs.len() {
            return Err(NlpError::CountMismatch {
                expected: inputs.len(),
                actual: resp.data.len(),
            });
        }
        let expected = self.config.dimension;
        if let Some(item) = resp.data.iter().find(|item| item.embedding.len() != expected) {
            return Err(NlpError::DimensionMismatch {
                expected,
                actual: item.embedding.len(),
            });
        }
        Ok(resp.data.into_iter().map(|item| item.embedding).collect())
    }

    async fn post_with_retry<T: Serialize>(
        &self,
        url: &str,
        api_key: &str,
        payload: &T,
    ) -> Result<EmbeddingResponse, NlpError> {
        let mut retry = 0;
        loop {
            let err = match self.client.post(url).bearer_auth(api_key).json(payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(resp.json::<EmbeddingResponse>().await?);
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    if !is_retryable(status) {
                        return Err(NlpError::HttpStatus { status, body });
                    }
                    NlpError::HttpStatus { status, body }
                }
                Err(e) => NlpError::Request(e),
            };
            if retry >= MAX_RETRIES {
                return Err(err);
            }
            warn!(retry, error = %err, "embedding request failed, retrying");
            sleep(backoff(retry)).await;
            retry += 1;
        }
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
