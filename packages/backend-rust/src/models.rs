use chrono::{DateTime, Utc};
use lexi_algo::{MemoryCard, MemoryState, Rating};
use serde::{Deserialize, Serialize};

/// A learner's memory record for one `(word, language)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    pub language: String,
    pub translation: Option<String>,
    pub state: MemoryState,
    pub due: DateTime<Utc>,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
    pub last_review: Option<DateTime<Utc>>,
    pub step: u32,
}

impl VocabularyEntry {
    /// A never-reviewed entry, due immediately.
    pub fn new(word: String, language: String, translation: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            word,
            language,
            translation,
            state: MemoryState::Learning,
            due: now,
            stability: None,
            difficulty: None,
            last_review: None,
            step: 0,
        }
    }

    pub fn is_new(&self) -> bool {
        self.stability.is_none() && self.difficulty.is_none()
    }

    pub fn card(&self) -> MemoryCard {
        MemoryCard {
            state: self.state,
            step: self.step,
            stability: self.stability,
            difficulty: self.difficulty,
        }
    }
}

/// Translation-only view used by the due list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueWord {
    pub word: String,
    pub language: String,
    pub translation: Option<String>,
}

impl From<VocabularyEntry> for DueWord {
    fn from(entry: VocabularyEntry) -> Self {
        Self {
            word: entry.word,
            language: entry.language,
            translation: entry.translation,
        }
    }
}

/// Append-only record of one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLogEntry {
    pub id: String,
    pub review_time: DateTime<Utc>,
    pub word: String,
    pub language: String,
    pub rating: Rating,
    pub state: MemoryState,
}

impl ReviewLogEntry {
    pub fn record(entry: &VocabularyEntry, rating: Rating, review_time: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            review_time,
            word: entry.word.clone(),
            language: entry.language.clone(),
            rating,
            state: entry.state,
        }
    }
}

/// Token alignment between a sentence and its translation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignmentResult {
    #[serde(rename = "src_tokenized")]
    pub source_tokens: Vec<String>,
    #[serde(rename = "trg_tokenized")]
    pub target_tokens: Vec<String>,
    #[serde(rename = "alignment")]
    pub pairs: Vec<(usize, usize)>,
}

impl AlignmentResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn unaligned(source_tokens: Vec<String>, target_tokens: Vec<String>) -> Self {
        Self {
            source_tokens,
            target_tokens,
            pairs: Vec::new(),
        }
    }

    /// Every pair indexes into both token sequences.
    pub fn is_in_bounds(&self) -> bool {
        self.pairs
            .iter()
            .all(|&(s, t)| s < self.source_tokens.len() && t < self.target_tokens.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Direct,
    Lemma,
    None,
    Error,
}

/// Vocabulary status of one source token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAnnotation {
    pub original_word: String,
    pub found_in_vocabulary: bool,
    pub match_type: MatchType,
    pub vocabulary_entry: Option<VocabularyEntry>,
}

impl WordAnnotation {
    pub fn found(original_word: &str, match_type: MatchType, entry: VocabularyEntry) -> Self {
        Self {
            original_word: original_word.to_string(),
            found_in_vocabulary: true,
            match_type,
            vocabulary_entry: Some(entry),
        }
    }

    pub fn missing(original_word: &str, match_type: MatchType) -> Self {
        Self {
            original_word: original_word.to_string(),
            found_in_vocabulary: false,
            match_type,
            vocabulary_entry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_serializes_with_wire_names() {
        let result = AlignmentResult {
            source_tokens: vec!["Hej".into()],
            target_tokens: vec!["Hi".into()],
            pairs: vec![(0, 0)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["src_tokenized"][0], "Hej");
        assert_eq!(json["alignment"][0][1], 0);
        assert!(result.is_in_bounds());
    }

    #[test]
    fn test_annotation_serialization() {
        let json = serde_json::to_value(WordAnnotation::missing("katt", MatchType::None)).unwrap();
        assert_eq!(json["match_type"], "none");
        assert_eq!(json["found_in_vocabulary"], false);
        assert!(json["vocabulary_entry"].is_null());
    }

    #[test]
    fn test_new_entry_is_unreviewed() {
        let now = Utc::now();
        let entry = VocabularyEntry::new("hej".into(), "sv".into(), None, now);
        assert!(entry.is_new());
        assert_eq!(entry.state, MemoryState::Learning);
        assert_eq!(entry.due, now);
        assert!(entry.card().is_new());
    }
}
