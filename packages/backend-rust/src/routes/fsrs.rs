use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{json_body, query_params, required};
use crate::models::{DueWord, VocabularyEntry};
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update", post(update))
        .route("/review", get(review))
        .route("/vocabulary", get(vocabulary))
        .route("/vocabulary/add", post(add_word))
        .route("/vocabulary/import", post(import_list))
        .route("/vocabulary/seed", post(seed))
        .route("/vocabulary/learning_list", get(learning_list))
        .route("/vocabulary/lookup", get(lookup))
}

#[derive(Debug, Deserialize)]
struct UpdateBody {
    word: Option<String>,
    language: Option<String>,
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddWordBody {
    word: Option<String>,
    language: Option<String>,
    translation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportBody {
    language: Option<String>,
    level: Option<String>,
    word_list: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    language: Option<String>,
    level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WordQuery {
    word: Option<String>,
    language: Option<String>,
}

#[derive(Serialize)]
struct WordsResponse<T> {
    words: Vec<T>,
}

#[derive(Serialize)]
struct CountResponse {
    language: String,
    level: String,
    count: u64,
}

async fn update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let word = required(body.word.as_deref(), "word")?;
    let language = required(body.language.as_deref(), "language")?;
    let rating = required(body.response.as_deref(), "response")?;

    let updated = state.scheduler().review_word(word, language, rating).await?;
    Ok(ok(updated))
}

async fn review(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let words: Vec<DueWord> = state.vocabulary().due_words(Utc::now()).await?;
    Ok(ok(WordsResponse { words }))
}

async fn vocabulary(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let words: Vec<VocabularyEntry> = state.vocabulary().list_all().await?;
    Ok(ok(WordsResponse { words }))
}

async fn add_word(
    State(state): State<AppState>,
    payload: Result<Json<AddWordBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let word = required(body.word.as_deref(), "word")?;
    let language = required(body.language.as_deref(), "language")?;

    let entry = state
        .vocabulary()
        .add_word(word, language, body.translation.as_deref())
        .await?;
    Ok(ok(entry))
}

async fn import_list(
    State(state): State<AppState>,
    payload: Result<Json<ImportBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let language = required(body.language.as_deref(), "language")?;
    let level = required(body.level.as_deref(), "level")?;
    let words = body
        .word_list
        .ok_or_else(|| AppError::validation("field 'wordList' is required"))?;

    let count = state.vocabulary().import_list(language, level, &words).await?;
    Ok(ok(CountResponse {
        language: language.to_lowercase(),
        level: level.to_uppercase(),
        count,
    }))
}

async fn seed(
    State(state): State<AppState>,
    payload: Result<Json<ListQuery>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let language = required(body.language.as_deref(), "language")?;
    let level = required(body.level.as_deref(), "level")?;

    let count = state.vocabulary().seed_from_list(language, level).await?;
    Ok(ok(CountResponse {
        language: language.to_lowercase(),
        level: level.to_uppercase(),
        count,
    }))
}

async fn learning_list(
    State(state): State<AppState>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    let language = required(params.language.as_deref(), "language")?;
    let level = required(params.level.as_deref(), "level")?;

    let words = state.vocabulary().learning_list(language, level).await?;
    Ok(ok(WordsResponse { words }))
}

async fn lookup(
    State(state): State<AppState>,
    params: Result<Query<WordQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    let word = required(params.word.as_deref(), "word")?;
    let language = required(params.language.as_deref(), "language")?;

    let entry = state.vocabulary().lookup(word, language).await?;
    Ok(ok(entry))
}
