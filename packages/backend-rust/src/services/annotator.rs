use std::sync::Arc;

use futures_util::future::join_all;

use crate::db::VocabularyStore;
use crate::error::CoreError;
use crate::models::{MatchType, WordAnnotation};
use crate::nlp::Lemmatizer;

/// Read-only vocabulary status lookup for source tokens: direct match
/// first, then the lemma. Failures degrade to `MatchType::Error` for the
/// affected token only.
#[derive(Clone)]
pub struct VocabularyAnnotator {
    store: VocabularyStore,
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl VocabularyAnnotator {
    pub fn new(store: VocabularyStore, lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Self { store, lemmatizer }
    }

    pub async fn annotate(&self, token: &str, language: &str) -> WordAnnotation {
        match self.classify(token, language).await {
            Ok(annotation) => annotation,
            Err(err) => {
                tracing::warn!(token, language, error = %err, "annotation degraded");
                WordAnnotation::missing(token, MatchType::Error)
            }
        }
    }

    /// One annotation per token, in order.
    pub async fn annotate_all(&self, tokens: &[String], language: &str) -> Vec<WordAnnotation> {
        join_all(tokens.iter().map(|token| self.annotate(token, language))).await
    }

    async fn classify(&self, token: &str, language: &str) -> Result<WordAnnotation, CoreError> {
        let surface = token.trim().to_lowercase();
        if surface.is_empty() {
            return Ok(WordAnnotation::missing(token, MatchType::None));
        }

        if let Some(entry) = self.store.get(&surface, language).await? {
            return Ok(WordAnnotation::found(token, MatchType::Direct, entry));
        }

        let lemma = self.lemmatizer.lemmatize(&surface, language).await?;
        let lemma = lemma.trim().to_lowercase();
        if !lemma.is_empty() && lemma != surface {
            if let Some(entry) = self.store.get(&lemma, language).await? {
                return Ok(WordAnnotation::found(token, MatchType::Lemma, entry));
            }
        }

        Ok(WordAnnotation::missing(token, MatchType::None))
    }
}
