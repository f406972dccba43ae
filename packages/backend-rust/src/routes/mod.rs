mod dictionary;
mod fsrs;
mod health;
mod translation;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .route("/api/translation", post(translation::translate))
        .route("/api/alignment", post(translation::align))
        .route("/api/dictionary/lookup", get(dictionary::lookup))
        .nest("/api/fsrs", fsrs::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("route not found").into_response()
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

pub(crate) fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

/// Trimmed non-empty value of a required field.
pub(crate) fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("field '{field}' is required")))
}
