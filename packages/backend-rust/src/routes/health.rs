use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    timestamp: String,
    start_time: String,
    uptime: u64,
    alignment_cache: CacheStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    translation_cache: Option<CacheStats>,
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
}

async fn root(State(state): State<AppState>) -> Response {
    let connected = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.store().pool())
        .await
        .map_err(|err| tracing::warn!(error = %err, "health check query failed"))
        .is_ok();

    let response = HealthResponse {
        status: if connected { "ok" } else { "degraded" },
        database: if connected { "connected" } else { "disconnected" },
        timestamp: now_iso(),
        start_time: DateTime::<Utc>::from(state.started_at_system()).to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.uptime_seconds(),
        alignment_cache: state.alignment_cache_stats(),
        translation_cache: state.translation_cache_stats(),
    };

    let status_code = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn live(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
