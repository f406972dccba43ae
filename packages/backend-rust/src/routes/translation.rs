use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::CoreError;
use crate::models::{AlignmentResult, WordAnnotation};
use crate::response::{ok, AppError};
use crate::services::TranslationRequest;
use crate::state::AppState;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBody {
    #[serde(default)]
    text: String,
    source_language: Option<String>,
    target_language: Option<String>,
    #[serde(default = "default_true")]
    split_sentences: bool,
    #[serde(default = "default_true")]
    mark_words: bool,
}

pub async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let request = TranslationRequest {
        text: body.text,
        source_language: body.source_language,
        target_language: body.target_language.unwrap_or_else(|| "EN".to_string()),
        split_sentences: body.split_sentences,
        mark_words: body.mark_words,
    };
    let output = state.translation().run(&request).await?;
    Ok(ok(output))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignBody {
    #[serde(default)]
    source_text: String,
    #[serde(default)]
    target_text: String,
    /// Annotate source tokens against this vocabulary language.
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct AlignResponse {
    #[serde(flatten)]
    alignment: AlignmentResult,
    #[serde(rename = "wordInfo", skip_serializing_if = "Option::is_none")]
    word_info: Option<Vec<WordAnnotation>>,
}

pub async fn align(
    State(state): State<AppState>,
    payload: Result<Json<AlignBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let alignment = state
        .aligner()
        .align(&body.source_text, &body.target_text)
        .await
        .map_err(CoreError::from)?;

    let language = body.language.as_deref().map(str::trim).filter(|l| !l.is_empty());
    let word_info = match language {
        Some(language) => Some(state.annotator().annotate_all(&alignment.source_tokens, language).await),
        None => None,
    };

    Ok(ok(AlignResponse { alignment, word_info }))
}
