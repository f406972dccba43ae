use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use super::{query_params, required};
use crate::response::{ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    word: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct LookupResponse {
    word: String,
    language: String,
    translation: String,
}

pub async fn lookup(
    State(state): State<AppState>,
    params: Result<Query<LookupQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    let word = required(params.word.as_deref(), "word")?;
    let language = required(params.language.as_deref(), "language")?;

    let translation = state.vocabulary().dictionary_lookup(word, language).await?;
    Ok(ok(LookupResponse {
        word: word.to_string(),
        language: language.to_string(),
        translation,
    }))
}
