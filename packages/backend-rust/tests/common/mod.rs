#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use lexi_algo::SchedulerParams;
use tempfile::TempDir;

use lexi_backend::config::{AlignmentConfig, DatabaseConfig};
use lexi_backend::db::{self, VocabularyStore};
use lexi_backend::nlp::{
    LexicalSimilarity, NlpError, RuleLemmatizer, SimilarityOracle, Translator, WordTokenizer,
};
use lexi_backend::state::{AppState, Collaborators};

/// A migrated SQLite store in a temp directory that lives as long as this value.
pub struct TestDb {
    pub dir: TempDir,
    pub store: VocabularyStore,
}

pub async fn test_db() -> TestDb {
    let dir = TempDir::new().expect("temp dir");
    let pool = db::connect(&DatabaseConfig::at(dir.path().join("vocabulary.db")))
        .await
        .expect("connect sqlite");
    TestDb {
        dir,
        store: VocabularyStore::new(pool),
    }
}

/// Looks words up in a fixed table, falls back to `<text>-en`.
#[derive(Default)]
pub struct StubTranslator {
    pub table: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl StubTranslator {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            table: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(&self, text: &str, _source: Option<&str>, _target: &str) -> Result<String, NlpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{text}-en")))
    }
}

pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str, _source: Option<&str>, _target: &str) -> Result<String, NlpError> {
        Err(NlpError::NotConfigured("DEEPL_API_KEY"))
    }
}

/// Lexical scores after a delay, counting calls; fails while `failures_left > 0`.
pub struct CountingOracle {
    pub calls: AtomicUsize,
    pub failures_left: AtomicUsize,
    pub delay: Duration,
}

impl CountingOracle {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn failing_first(n: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(n),
            ..Self::new(Duration::ZERO)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SimilarityOracle for CountingOracle {
    async fn score(&self, source: &[String], target: &[String]) -> Result<Vec<Vec<f64>>, NlpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(NlpError::Backend("oracle unavailable".into()));
        }
        Ok(LexicalSimilarity::matrix(source, target))
    }
}

/// Returns a matrix with one row too few.
pub struct MisshapenOracle;

#[async_trait]
impl SimilarityOracle for MisshapenOracle {
    async fn score(&self, source: &[String], target: &[String]) -> Result<Vec<Vec<f64>>, NlpError> {
        Ok(vec![vec![1.0; target.len()]; source.len().saturating_sub(1)])
    }
}

pub fn collaborators(oracle: Arc<dyn SimilarityOracle>, translator: Arc<dyn Translator>) -> Collaborators {
    Collaborators {
        tokenizer: Arc::new(WordTokenizer),
        lemmatizer: Arc::new(RuleLemmatizer),
        oracle,
        translator,
        translation_cache: None,
    }
}

pub fn test_state(store: VocabularyStore, translator: Arc<dyn Translator>) -> AppState {
    AppState::new(
        store,
        collaborators(Arc::new(LexicalSimilarity), translator),
        SchedulerParams::default(),
        &AlignmentConfig::default(),
    )
}

pub fn test_app(store: VocabularyStore, translator: Arc<dyn Translator>) -> Router {
    lexi_backend::create_app(test_state(store, translator), Duration::from_secs(30))
}
