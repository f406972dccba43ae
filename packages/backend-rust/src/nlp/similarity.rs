use std::collections::HashSet;

use async_trait::async_trait;

use super::embedding::{cosine_similarity, EmbeddingClient};
use super::{NlpError, SimilarityOracle};

/// Character-bigram Dice coefficient over lowercased, boundary-padded
/// tokens. Deterministic and offline; catches cognates and loanwords.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalSimilarity;

impl LexicalSimilarity {
    pub fn similarity(a: &str, b: &str) -> f64 {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }
        let left = bigrams(&a);
        let right = bigrams(&b);
        let shared = left.intersection(&right).count();
        (2 * shared) as f64 / (left.len() + right.len()) as f64
    }

    pub fn matrix(source: &[String], target: &[String]) -> Vec<Vec<f64>> {
        source
            .iter()
            .map(|s| target.iter().map(|t| Self::similarity(s, t)).collect())
            .collect()
    }
}

fn bigrams(word: &str) -> HashSet<(char, char)> {
    let padded: Vec<char> = std::iter::once('^').chain(word.chars()).chain(std::iter::once('$')).collect();
    padded.windows(2).map(|w| (w[0], w[1])).collect()
}

#[async_trait]
impl SimilarityOracle for LexicalSimilarity {
    async fn score(&self, source: &[String], target: &[String]) -> Result<Vec<Vec<f64>>, NlpError> {
        Ok(Self::matrix(source, target))
    }
}

/// Cosine similarity between token embeddings, one batched request per
/// sentence pair.
#[derive(Clone)]
pub struct EmbeddingSimilarity {
    client: EmbeddingClient,
}

impl EmbeddingSimilarity {
    pub fn new(client: EmbeddingClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SimilarityOracle for EmbeddingSimilarity {
    async fn score(&self, source: &[String], target: &[String]) -> Result<Vec<Vec<f64>>, NlpError> {
        if source.is_empty() || target.is_empty() {
            return Ok(vec![Vec::new(); source.len()]);
        }
        let inputs: Vec<String> = source.iter().chain(target).cloned().collect();
        let vectors = self.client.embed_texts(&inputs).await?;
        let (src_vecs, trg_vecs) = vectors.split_at(source.len());

        Ok(src_vecs
            .iter()
            .map(|s| trg_vecs.iter().map(|t| cosine_similarity(s, t)).collect())
            .collect())
    }
}
