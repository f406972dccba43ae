use std::sync::Arc;

use serde::Serialize;

use crate::error::CoreError;
use crate::models::WordAnnotation;
use crate::nlp::{split_sentences, Translator};
use crate::services::alignment::AlignmentEngine;
use crate::services::annotator::VocabularyAnnotator;

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: Option<String>,
    pub target_language: String,
    pub split_sentences: bool,
    pub mark_words: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentenceTranslation {
    pub original: String,
    pub translated: String,
    pub src_tokenized: Vec<String>,
    pub trg_tokenized: Vec<String>,
    pub alignment: Vec<(usize, usize)>,
    #[serde(rename = "wordInfo")]
    pub word_info: Vec<WordAnnotation>,
}

/// Token pairs for the whole text: one list per sentence when the text was
/// split, otherwise the single sentence's pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextAlignment {
    PerSentence(Vec<Vec<(usize, usize)>>),
    Single(Vec<(usize, usize)>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationOutput {
    pub original_text: String,
    pub translated_text: String,
    pub alignment: TextAlignment,
    pub sentences: Vec<SentenceTranslation>,
}

/// Full-text translation followed by per-sentence alignment and, when
/// requested, vocabulary annotation of the source tokens.
#[derive(Clone)]
pub struct TranslationPipeline {
    translator: Arc<dyn Translator>,
    aligner: Arc<AlignmentEngine>,
    annotator: VocabularyAnnotator,
}

impl TranslationPipeline {
    pub fn new(translator: Arc<dyn Translator>, aligner: Arc<AlignmentEngine>, annotator: VocabularyAnnotator) -> Self {
        Self {
            translator,
            aligner,
            annotator,
        }
    }

    pub async fn run(&self, request: &TranslationRequest) -> Result<TranslationOutput, CoreError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(CoreError::validation("field 'text' cannot be empty"));
        }
        let target = request.target_language.trim();
        if target.is_empty() {
            return Err(CoreError::validation("field 'targetLanguage' is required"));
        }
        let source = request
            .source_language
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let translated = self
            .translator
            .translate(text, source.map(str::to_uppercase).as_deref(), &target.to_uppercase())
            .await?;

        let (originals, translations) = if request.split_sentences {
            (split_sentences(text), split_sentences(&translated))
        } else {
            (vec![text.to_string()], vec![translated.clone()])
        };
        if originals.len() != translations.len() {
            tracing::debug!(
                original = originals.len(),
                translated = translations.len(),
                "sentence counts differ, extra sentences dropped"
            );
        }

        let annotate_language = source.filter(|_| request.mark_words).map(str::to_lowercase);
        let mut sentences = Vec::with_capacity(originals.len().min(translations.len()));
        for (original, translated_sentence) in originals.into_iter().zip(translations) {
            let aligned = self.aligner.align(&original, &translated_sentence).await?;
            let word_info = match annotate_language.as_deref() {
                Some(language) => self.annotator.annotate_all(&aligned.source_tokens, language).await,
                None => Vec::new(),
            };
            sentences.push(SentenceTranslation {
                original,
                translated: translated_sentence,
                src_tokenized: aligned.source_tokens,
                trg_tokenized: aligned.target_tokens,
                alignment: aligned.pairs,
                word_info,
            });
        }

        let alignment = if request.split_sentences {
            TextAlignment::PerSentence(sentences.iter().map(|s| s.alignment.clone()).collect())
        } else {
            TextAlignment::Single(sentences.first().map(|s| s.alignment.clone()).unwrap_or_default())
        };

        Ok(TranslationOutput {
            original_text: text.to_string(),
            translated_text: translated,
            alignment,
            sentences,
        })
    }
}
