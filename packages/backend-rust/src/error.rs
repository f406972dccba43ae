use thiserror::Error;

use crate::nlp::NlpError;

/// Error returned by every core operation.
///
/// Callers pick a retry policy per kind: `Validation` and `NotFound` are
/// final, `Computation` wraps a collaborator failure, `Store` a failed
/// (and rolled back) transaction.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("word '{word}' ({language}) not found in vocabulary")]
    NotFound { word: String, language: String },
    #[error("{context} failed: {source}")]
    Computation {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(word: impl Into<String>, language: impl Into<String>) -> Self {
        Self::NotFound {
            word: word.into(),
            language: language.into(),
        }
    }

    pub fn computation<E>(context: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Computation {
            context,
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Computation { .. } => "computation",
            Self::Store(_) => "store",
        }
    }
}

impl From<NlpError> for CoreError {
    fn from(err: NlpError) -> Self {
        Self::computation("collaborator call", err)
    }
}

/// Lowercase and trim a `(word, language)` key; both parts are required.
pub fn normalize_key(word: &str, language: &str) -> Result<(String, String), CoreError> {
    let word = word.trim().to_lowercase();
    let language = language.trim().to_lowercase();
    if word.is_empty() {
        return Err(CoreError::validation("field 'word' is required"));
    }
    if language.is_empty() {
        return Err(CoreError::validation("field 'language' is required"));
    }
    Ok((word, language))
}
