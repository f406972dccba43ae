use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::VocabularyStore;
use crate::error::{normalize_key, CoreError};
use crate::models::{DueWord, VocabularyEntry};
use crate::nlp::Translator;

const GLOSS_TARGET: &str = "EN";

/// Vocabulary management around the store: adding words (with an
/// optional machine-translated gloss), list import and seeding, queries.
#[derive(Clone)]
pub struct VocabularyService {
    store: VocabularyStore,
    translator: Arc<dyn Translator>,
}

impl VocabularyService {
    pub fn new(store: VocabularyStore, translator: Arc<dyn Translator>) -> Self {
        Self { store, translator }
    }

    pub fn store(&self) -> &VocabularyStore {
        &self.store
    }

    /// Add a word. Without a supplied translation one is fetched; a
    /// translator failure stores the word without a gloss.
    pub async fn add_word(
        &self,
        word: &str,
        language: &str,
        translation: Option<&str>,
    ) -> Result<VocabularyEntry, CoreError> {
        self.add_word_at(word, language, translation, Utc::now()).await
    }

    pub async fn add_word_at(
        &self,
        word: &str,
        language: &str,
        translation: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<VocabularyEntry, CoreError> {
        let (word, language) = normalize_key(word, language)?;
        let supplied = translation.map(str::trim).filter(|t| !t.is_empty());

        let translation = match supplied {
            Some(t) => Some(t.to_string()),
            None => {
                let existing = self.store.get(&word, &language).await?;
                if existing.as_ref().is_some_and(|e| e.translation.is_some()) {
                    None
                } else {
                    self.fetch_gloss(&word, &language).await
                }
            }
        };

        self.store.add(&word, &language, translation.as_deref(), now).await
    }

    pub async fn lookup(&self, word: &str, language: &str) -> Result<VocabularyEntry, CoreError> {
        let (word, language) = normalize_key(word, language)?;
        self.store
            .get(&word, &language)
            .await?
            .ok_or_else(|| CoreError::not_found(word, language))
    }

    /// Single-word dictionary lookup into English.
    pub async fn dictionary_lookup(&self, word: &str, language: &str) -> Result<String, CoreError> {
        let (word, language) = normalize_key(word, language)?;
        let translated = self
            .translator
            .translate(&word, Some(&language.to_uppercase()), GLOSS_TARGET)
            .await?;
        Ok(translated.trim().to_string())
    }

    pub async fn import_list<S: AsRef<str>>(&self, language: &str, level: &str, words: &[S]) -> Result<u64, CoreError> {
        self.store.import_list(language, level, words).await
    }

    pub async fn seed_from_list(&self, language: &str, level: &str) -> Result<u64, CoreError> {
        self.store.seed_from_list(language, level, Utc::now()).await
    }

    pub async fn learning_list(&self, language: &str, level: &str) -> Result<Vec<String>, CoreError> {
        self.store.learning_list(language, level).await
    }

    pub async fn due_words(&self, as_of: DateTime<Utc>) -> Result<Vec<DueWord>, CoreError> {
        let entries = self.store.due_for_review(as_of).await?;
        Ok(entries.into_iter().map(DueWord::from).collect())
    }

    pub async fn list_all(&self) -> Result<Vec<VocabularyEntry>, CoreError> {
        self.store.list_all().await
    }

    async fn fetch_gloss(&self, word: &str, language: &str) -> Option<String> {
        match self
            .translator
            .translate(word, Some(&language.to_uppercase()), GLOSS_TARGET)
            .await
        {
            Ok(text) => Some(text.trim().to_lowercase()).filter(|t| !t.is_empty()),
            Err(err) => {
                tracing::warn!(word, language, error = %err, "translation unavailable, storing word without gloss");
                None
            }
        }
    }
}
