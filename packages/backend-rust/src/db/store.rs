use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::operations::{review_log, vocabulary, word_lists};
use crate::error::{normalize_key, CoreError};
use crate::models::{ReviewLogEntry, VocabularyEntry};

/// Owns the per-word memory records, the review log and the reference
/// word lists. Every method runs in its own transaction; an early return
/// drops the transaction, which rolls it back.
#[derive(Clone)]
pub struct VocabularyStore {
    pool: SqlitePool,
}

impl VocabularyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get(&self, word: &str, language: &str) -> Result<Option<VocabularyEntry>, CoreError> {
        let (word, language) = normalize_key(word, language)?;
        let mut conn = self.pool.acquire().await?;
        Ok(vocabulary::select_entry(&mut conn, &word, &language).await?)
    }

    /// Create the entry if absent. Translations are stored lowercased. An
    /// existing entry only gains a translation when it has none; its review
    /// state is left alone.
    pub async fn add(
        &self,
        word: &str,
        language: &str,
        translation: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<VocabularyEntry, CoreError> {
        let (word, language) = normalize_key(word, language)?;
        let translation = translation
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let mut tx = self.pool.begin().await?;
        let fresh = VocabularyEntry::new(word.clone(), language.clone(), translation.clone(), now);
        let inserted = vocabulary::insert_entry_if_absent(&mut tx, &fresh, now).await?;
        if !inserted {
            if let Some(t) = translation.as_deref() {
                vocabulary::fill_missing_translation(&mut tx, &word, &language, t).await?;
            }
        }
        let stored = vocabulary::select_entry(&mut tx, &word, &language)
            .await?
            .ok_or_else(|| CoreError::not_found(word.as_str(), language.as_str()))?;
        tx.commit().await?;

        if inserted {
            tracing::info!(word = %stored.word, language = %stored.language, "vocabulary entry added");
        } else {
            tracing::debug!(word = %stored.word, language = %stored.language, "vocabulary entry already present");
        }
        Ok(stored)
    }

    /// Deduplicating bulk insert into the reference lists. Returns the
    /// number of rows actually inserted.
    pub async fn import_list<S: AsRef<str>>(
        &self,
        language: &str,
        level: &str,
        words: &[S],
    ) -> Result<u64, CoreError> {
        let language = language.trim().to_lowercase();
        let level = level.trim().to_uppercase();
        if language.is_empty() {
            return Err(CoreError::validation("field 'language' is required"));
        }
        if level.is_empty() {
            return Err(CoreError::validation("field 'level' is required"));
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            if word_lists::insert_word_if_absent(&mut tx, &language, &level, &word).await? {
                inserted += 1;
            }
        }
        tx.commit().await?;

        tracing::info!(%language, %level, submitted = words.len(), inserted, "word list imported");
        Ok(inserted)
    }

    pub async fn learning_list(&self, language: &str, level: &str) -> Result<Vec<String>, CoreError> {
        let language = language.trim().to_lowercase();
        let level = level.trim().to_uppercase();
        let mut conn = self.pool.acquire().await?;
        Ok(word_lists::select_words(&mut conn, &language, &level).await?)
    }

    /// Create a Learning entry for every listed word not yet in the
    /// vocabulary. Returns the number of entries created.
    pub async fn seed_from_list(
        &self,
        language: &str,
        level: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, CoreError> {
        let language = language.trim().to_lowercase();
        let level = level.trim().to_uppercase();

        let mut tx = self.pool.begin().await?;
        let words = word_lists::select_words(&mut tx, &language, &level).await?;
        let mut created = 0u64;
        for word in words {
            let entry = VocabularyEntry::new(word, language.clone(), None, now);
            if vocabulary::insert_entry_if_absent(&mut tx, &entry, now).await? {
                created += 1;
            }
        }
        tx.commit().await?;

        tracing::info!(%language, %level, created, "vocabulary seeded from word list");
        Ok(created)
    }

    pub async fn due_for_review(&self, as_of: DateTime<Utc>) -> Result<Vec<VocabularyEntry>, CoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(vocabulary::select_due(&mut conn, as_of).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<VocabularyEntry>, CoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(vocabulary::select_all(&mut conn).await?)
    }

    pub async fn append_log(&self, log: &ReviewLogEntry) -> Result<(), CoreError> {
        let mut tx = self.pool.begin().await?;
        review_log::insert_log(&mut tx, log).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Persist a reviewed entry together with its log row. Either both
    /// land or neither does.
    pub async fn commit_review(&self, entry: &VocabularyEntry, log: &ReviewLogEntry) -> Result<(), CoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = vocabulary::update_memory(&mut tx, entry).await?;
        if updated == 0 {
            return Err(CoreError::not_found(entry.word.as_str(), entry.language.as_str()));
        }
        review_log::insert_log(&mut tx, log).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn review_history(&self, word: &str, language: &str) -> Result<Vec<ReviewLogEntry>, CoreError> {
        let (word, language) = normalize_key(word, language)?;
        let mut conn = self.pool.acquire().await?;
        Ok(review_log::select_history(&mut conn, &word, &language).await?)
    }
}
