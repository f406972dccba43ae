pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod nlp;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::http::StatusCode;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::{DbInitError, VocabularyStore};
use crate::state::{AppState, Collaborators};

/// Open the database and wire the production collaborators.
pub async fn build_state(config: &Config) -> Result<AppState, DbInitError> {
    let pool = db::connect(&config.database).await?;
    Ok(AppState::new(
        VocabularyStore::new(pool),
        Collaborators::from_config(config),
        config.scheduler.clone(),
        &config.alignment,
    ))
}

pub fn create_app(state: AppState, request_timeout: Duration) -> axum::Router {
    routes::router(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
