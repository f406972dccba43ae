use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{NlpError, Tokenizer};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{M}\p{N}]+(?:['\u{2019}\-][\p{L}\p{M}\p{N}]+)*|[^\s\p{L}\p{M}\p{N}]")
        .expect("invalid token regex")
});

static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?\u{2026}]+["'\u{201D}\u{2019})\]]*(\s+|$)"#)
        .expect("invalid sentence regex")
});

/// Words (with inner apostrophes/hyphens) and single punctuation marks.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn tokenize_str(text: &str) -> Vec<String> {
        TOKEN_RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }
}

#[async_trait]
impl Tokenizer for WordTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<String>, NlpError> {
        Ok(Self::tokenize_str(text))
    }
}

/// Split on terminal punctuation followed by whitespace or end of text.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}
