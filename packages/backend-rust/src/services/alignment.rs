use std::sync::Arc;

use lexi_algo::max_weight_matching;
use lexi_algo::sanitize::{is_well_shaped, sanitize_similarity_matrix};
use thiserror::Error;

use crate::cache::{CacheStats, SingleFlightCache};
use crate::config::AlignmentConfig;
use crate::error::CoreError;
use crate::models::AlignmentResult;
use crate::nlp::{NlpError, SimilarityOracle, Tokenizer};

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("tokenization failed: {0}")]
    Tokenize(#[source] NlpError),
    #[error("similarity scoring failed: {0}")]
    Score(#[source] NlpError),
    #[error("similarity matrix has wrong shape: expected {rows}x{cols}")]
    Shape { rows: usize, cols: usize },
}

impl From<AlignmentError> for CoreError {
    fn from(err: AlignmentError) -> Self {
        CoreError::computation("alignment", err)
    }
}

/// Token alignment via maximum-weight bipartite matching over oracle scores.
///
/// Results are memoized by the literal `(source, target)` text pair in a
/// bounded single-flight cache; failed computations are never cached.
pub struct AlignmentEngine {
    tokenizer: Arc<dyn Tokenizer>,
    oracle: Arc<dyn SimilarityOracle>,
    threshold: f64,
    cache: SingleFlightCache<(String, String), AlignmentResult>,
}

impl AlignmentEngine {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        oracle: Arc<dyn SimilarityOracle>,
        config: &AlignmentConfig,
    ) -> Self {
        Self {
            tokenizer,
            oracle,
            threshold: config.threshold,
            cache: SingleFlightCache::new(config.cache_capacity),
        }
    }

    pub async fn align(&self, source_text: &str, target_text: &str) -> Result<AlignmentResult, AlignmentError> {
        if source_text.trim().is_empty() || target_text.trim().is_empty() {
            return Ok(AlignmentResult::empty());
        }

        let key = (source_text.to_string(), target_text.to_string());
        self.cache
            .get_or_try_insert_with(key, || self.compute(source_text, target_text))
            .await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn compute(&self, source_text: &str, target_text: &str) -> Result<AlignmentResult, AlignmentError> {
        let source_tokens = self
            .tokenizer
            .tokenize(source_text)
            .await
            .map_err(AlignmentError::Tokenize)?;
        let target_tokens = self
            .tokenizer
            .tokenize(target_text)
            .await
            .map_err(AlignmentError::Tokenize)?;

        if source_tokens.is_empty() || target_tokens.is_empty() {
            return Ok(AlignmentResult::unaligned(source_tokens, target_tokens));
        }

        let mut scores = self
            .oracle
            .score(&source_tokens, &target_tokens)
            .await
            .map_err(AlignmentError::Score)?;
        let (rows, cols) = (source_tokens.len(), target_tokens.len());
        if !is_well_shaped(&scores, rows, cols) {
            return Err(AlignmentError::Shape { rows, cols });
        }
        sanitize_similarity_matrix(&mut scores);

        let pairs = max_weight_matching(&scores, self.threshold);
        tracing::debug!(
            source_tokens = rows,
            target_tokens = cols,
            pairs = pairs.len(),
            "alignment computed"
        );

        Ok(AlignmentResult {
            source_tokens,
            target_tokens,
            pairs,
        })
    }
}
