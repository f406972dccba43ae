use std::sync::Arc;
use std::time::{Instant, SystemTime};

use lexi_algo::SchedulerParams;

use crate::cache::CacheStats;
use crate::config::{AlignmentConfig, Config};
use crate::db::VocabularyStore;
use crate::nlp::{
    CachedTranslator, DeepLTranslator, EmbeddingClient, EmbeddingSimilarity, Lemmatizer, LexicalSimilarity,
    RuleLemmatizer, SimilarityOracle, Tokenizer, Translator, WordTokenizer,
};
use crate::services::{
    AlignmentEngine, SpacedRepetitionScheduler, TranslationPipeline, VocabularyAnnotator, VocabularyService,
};

/// The injected NLP backends.
#[derive(Clone)]
pub struct Collaborators {
    pub tokenizer: Arc<dyn Tokenizer>,
    pub lemmatizer: Arc<dyn Lemmatizer>,
    pub oracle: Arc<dyn SimilarityOracle>,
    pub translator: Arc<dyn Translator>,
    pub translation_cache: Option<Arc<CachedTranslator>>,
}

impl Collaborators {
    /// Embedding similarity when an embedding key is configured, lexical
    /// similarity otherwise; DeepL behind a bounded translation memo.
    pub fn from_config(config: &Config) -> Self {
        let oracle: Arc<dyn SimilarityOracle> = if config.embedding.is_available() {
            let client = EmbeddingClient::new(config.embedding.clone());
            tracing::info!(model = client.model(), "similarity oracle: embeddings");
            Arc::new(EmbeddingSimilarity::new(client))
        } else {
            tracing::info!("similarity oracle: lexical");
            Arc::new(LexicalSimilarity)
        };

        let deepl = DeepLTranslator::new(&config.translator);
        if !deepl.is_available() {
            tracing::warn!("DEEPL_API_KEY not set, translations will fail");
        }
        let cached = Arc::new(CachedTranslator::new(Arc::new(deepl), config.translator.cache_capacity));

        Self {
            tokenizer: Arc::new(WordTokenizer),
            lemmatizer: Arc::new(RuleLemmatizer),
            oracle,
            translator: cached.clone(),
            translation_cache: Some(cached),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    store: VocabularyStore,
    aligner: Arc<AlignmentEngine>,
    annotator: VocabularyAnnotator,
    scheduler: Arc<SpacedRepetitionScheduler>,
    vocabulary: VocabularyService,
    translation: TranslationPipeline,
    translation_cache: Option<Arc<CachedTranslator>>,
}

impl AppState {
    pub fn new(
        store: VocabularyStore,
        collaborators: Collaborators,
        scheduler: SchedulerParams,
        alignment: &AlignmentConfig,
    ) -> Self {
        let aligner = Arc::new(AlignmentEngine::new(
            collaborators.tokenizer,
            collaborators.oracle,
            alignment,
        ));
        let annotator = VocabularyAnnotator::new(store.clone(), collaborators.lemmatizer);
        let translation = TranslationPipeline::new(
            Arc::clone(&collaborators.translator),
            Arc::clone(&aligner),
            annotator.clone(),
        );

        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            scheduler: Arc::new(SpacedRepetitionScheduler::new(store.clone(), scheduler)),
            vocabulary: VocabularyService::new(store.clone(), collaborators.translator),
            store,
            aligner,
            annotator,
            translation,
            translation_cache: collaborators.translation_cache,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn store(&self) -> &VocabularyStore {
        &self.store
    }

    pub fn aligner(&self) -> &AlignmentEngine {
        &self.aligner
    }

    pub fn annotator(&self) -> &VocabularyAnnotator {
        &self.annotator
    }

    pub fn scheduler(&self) -> &SpacedRepetitionScheduler {
        &self.scheduler
    }

    pub fn vocabulary(&self) -> &VocabularyService {
        &self.vocabulary
    }

    pub fn translation(&self) -> &TranslationPipeline {
        &self.translation
    }

    pub fn alignment_cache_stats(&self) -> CacheStats {
        self.aligner.cache_stats()
    }

    pub fn translation_cache_stats(&self) -> Option<CacheStats> {
        self.translation_cache.as_ref().map(|cache| cache.stats())
    }
}
