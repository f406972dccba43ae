//! Capability interfaces for the NLP collaborators and their concrete
//! backends. The services only see the traits; `state` picks the backends.

pub mod embedding;
pub mod lemmatizer;
pub mod similarity;
pub mod tokenizer;
pub mod translator;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use embedding::EmbeddingClient;
pub use lemmatizer::RuleLemmatizer;
pub use similarity::{EmbeddingSimilarity, LexicalSimilarity};
pub use tokenizer::{split_sentences, WordTokenizer};
pub use translator::{CachedTranslator, DeepLTranslator};

pub(crate) const MAX_RETRIES: usize = 3;
pub(crate) const BASE_BACKOFF_MS: u64 = 200;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty response from {0}")]
    Empty(&'static str),
    #[error("count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait Tokenizer: Send + Sync {
    /// Ordered tokens; identical input must give identical output.
    async fn tokenize(&self, text: &str) -> Result<Vec<String>, NlpError>;
}

#[async_trait]
pub trait Lemmatizer: Send + Sync {
    async fn lemmatize(&self, token: &str, language: &str) -> Result<String, NlpError>;
}

#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    /// Dense `source.len() x target.len()` score matrix.
    async fn score(&self, source: &[String], target: &[String]) -> Result<Vec<Vec<f64>>, NlpError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// `source` of `None` lets the backend detect the language.
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String, NlpError>;
}

pub(crate) fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

pub(crate) fn backoff(retry: usize) -> Duration {
    Duration::from_millis(BASE_BACKOFF_MS * (1 << retry))
}

pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
