use chrono::{DateTime, Duration, Utc};
use lexi_algo::{schedule, Rating, SchedulerParams};

use crate::db::VocabularyStore;
use crate::error::{normalize_key, CoreError};
use crate::models::{ReviewLogEntry, VocabularyEntry};
use crate::services::key_lock::KeyedLocks;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Applies review ratings to stored memory records.
///
/// Reviews of the same `(word, language)` are serialized through a per-key
/// lock; the entry update and its log row commit in one transaction.
pub struct SpacedRepetitionScheduler {
    store: VocabularyStore,
    params: SchedulerParams,
    locks: KeyedLocks<(String, String)>,
}

impl SpacedRepetitionScheduler {
    pub fn new(store: VocabularyStore, params: SchedulerParams) -> Self {
        Self {
            store,
            params,
            locks: KeyedLocks::new(),
        }
    }

    pub fn params(&self) -> &SchedulerParams {
        &self.params
    }

    /// Review with a textual rating (`again|hard|good|easy`, any case).
    pub async fn review_word(&self, word: &str, language: &str, rating: &str) -> Result<VocabularyEntry, CoreError> {
        let rating = Rating::parse(rating).ok_or_else(|| {
            CoreError::validation(format!(
                "invalid rating '{}', expected one of again, hard, good, easy",
                rating.trim()
            ))
        })?;
        self.review_word_at(word, language, rating, Utc::now()).await
    }

    pub async fn review_word_at(
        &self,
        word: &str,
        language: &str,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<VocabularyEntry, CoreError> {
        let key = normalize_key(word, language)?;
        let _guard = self.locks.lock(&key).await;
        let (word, language) = key;

        let current = self
            .store
            .get(&word, &language)
            .await?
            .ok_or_else(|| CoreError::not_found(word.as_str(), language.as_str()))?;

        let elapsed_days = current
            .last_review
            .map(|last| (now - last).num_milliseconds() as f64 / MS_PER_DAY);
        let outcome = schedule(&current.card(), rating, elapsed_days, &self.params);

        // saturates instead of overflowing on absurd intervals
        let mut due = Duration::try_milliseconds((outcome.interval_days * MS_PER_DAY).round() as i64)
            .and_then(|interval| now.checked_add_signed(interval))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if rating.is_pass() && due < current.due {
            due = current.due;
        }

        let updated = VocabularyEntry {
            state: outcome.card.state,
            step: outcome.card.step,
            stability: outcome.card.stability,
            difficulty: outcome.card.difficulty,
            due,
            last_review: Some(now),
            ..current
        };
        let log = ReviewLogEntry::record(&updated, rating, now);
        self.store.commit_review(&updated, &log).await?;

        tracing::info!(
            word = %updated.word,
            language = %updated.language,
            rating = rating.as_str(),
            state = updated.state.as_str(),
            step = updated.step,
            interval_days = outcome.interval_days,
            retrievability = outcome.retrievability,
            "word reviewed"
        );
        Ok(updated)
    }
}
