use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use lexi_algo::SchedulerParams;
use lexi_backend::config::AlignmentConfig;
use lexi_backend::state::AppState;

mod common;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn app() -> (common::TestDb, Router) {
    let db = common::test_db().await;
    let translator = Arc::new(common::StubTranslator::with(&[
        ("hej", "hello"),
        ("Hej! Jag har hundar.", "Hello! I have dogs."),
        ("Hotel Berlin", "Hotel Berlin"),
    ]));
    let app = common::test_app(db.store.clone(), translator);
    (db, app)
}

#[tokio::test]
async fn test_health_reports_cache_stats() {
    let (_db, app) = app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["alignmentCache"]["capacity"], 1024);

    let (status, body) = send(&app, get("/health/live")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_add_review_and_list_flow() {
    let (_db, app) = app().await;

    let (status, body) = send(
        &app,
        post_json("/api/fsrs/vocabulary/add", json!({ "word": "Hej", "language": "sv" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["word"], "hej");
    assert_eq!(body["data"]["translation"], "hello");
    assert!(body["data"]["stability"].is_null());

    let (status, body) = send(&app, get("/api/fsrs/review")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["words"][0]["word"], "hej");

    let (status, body) = send(
        &app,
        post_json("/api/fsrs/update", json!({ "word": "hej", "language": "sv", "response": "good" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["stability"].as_f64().unwrap() > 0.0);
    assert_eq!(body["data"]["step"], 1);

    let (_, body) = send(&app, get("/api/fsrs/review")).await;
    assert!(body["data"]["words"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, get("/api/fsrs/vocabulary/lookup?word=HEJ&language=sv")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["word"], "hej");

    let (_, body) = send(&app, get("/api/fsrs/vocabulary")).await;
    assert_eq!(body["data"]["words"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_review_errors_map_to_status_codes() {
    let (_db, app) = app().await;

    let (status, body) = send(
        &app,
        post_json("/api/fsrs/update", json!({ "word": "saknas", "language": "sv", "response": "good" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = send(
        &app,
        post_json("/api/fsrs/update", json!({ "word": "saknas", "language": "sv", "response": "meh" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app, post_json("/api/fsrs/update", json!({ "word": "hej" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/fsrs/update")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_import_learning_list_and_seed() {
    let (_db, app) = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/fsrs/vocabulary/import",
            json!({ "language": "SV", "level": "a1", "wordList": ["hej", "tack", "hej"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["level"], "A1");

    let (_, body) = send(&app, get("/api/fsrs/vocabulary/learning_list?language=sv&level=A1")).await;
    assert_eq!(body["data"]["words"], json!(["hej", "tack"]));

    let (status, _) = send(&app, get("/api/fsrs/vocabulary/learning_list?language=sv")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        post_json("/api/fsrs/vocabulary/seed", json!({ "language": "sv", "level": "A1" })),
    )
    .await;
    assert_eq!(body["data"]["count"], 2);

    let (_, body) = send(&app, get("/api/fsrs/vocabulary")).await;
    assert_eq!(body["data"]["words"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_translation_pipeline_annotates_source_tokens() {
    let (_db, app) = app().await;
    send(
        &app,
        post_json("/api/fsrs/vocabulary/add", json!({ "word": "hund", "language": "sv", "translation": "dog" })),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/translation",
            json!({ "text": "Hej! Jag har hundar.", "sourceLanguage": "sv", "targetLanguage": "en" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["translatedText"], "Hello! I have dogs.");
    let sentences = data["sentences"].as_array().unwrap();
    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[1]["original"], "Jag har hundar.");
    assert_eq!(sentences[1]["src_tokenized"], json!(["Jag", "har", "hundar", "."]));

    assert_eq!(data["alignment"].as_array().unwrap().len(), 2);
    assert_eq!(data["alignment"][1], sentences[1]["alignment"]);

    let info = sentences[1]["wordInfo"].as_array().unwrap();
    assert_eq!(info.len(), 4);
    assert_eq!(info[2]["match_type"], "lemma");
    assert_eq!(info[2]["vocabulary_entry"]["word"], "hund");

    let (status, _) = send(&app, post_json("/api/translation", json!({ "text": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsplit_translation_carries_a_single_alignment() {
    let (_db, app) = app().await;
    let (status, body) = send(
        &app,
        post_json(
            "/api/translation",
            json!({ "text": "Hotel Berlin", "sourceLanguage": "de", "splitSentences": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["alignment"], json!([[0, 0], [1, 1]]));
    assert_eq!(body["data"]["sentences"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let db = common::test_db().await;
    let collaborators = common::collaborators(
        Arc::new(common::CountingOracle::new(Duration::from_millis(500))),
        Arc::new(common::StubTranslator::default()),
    );
    let state = AppState::new(
        db.store.clone(),
        collaborators,
        SchedulerParams::default(),
        &AlignmentConfig::default(),
    );
    let app = lexi_backend::create_app(state, Duration::from_millis(20));

    let (status, _) = send(
        &app,
        post_json("/api/alignment", json!({ "sourceText": "Hej", "targetText": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_alignment_endpoint_and_dictionary_lookup() {
    let (_db, app) = app().await;

    let (status, body) = send(
        &app,
        post_json("/api/alignment", json!({ "sourceText": "", "targetText": "Hej" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["src_tokenized"], json!([]));
    assert_eq!(body["data"]["alignment"], json!([]));

    let (_, body) = send(
        &app,
        post_json("/api/alignment", json!({ "sourceText": "Hotel Berlin", "targetText": "Hotel Berlin" })),
    )
    .await;
    assert_eq!(body["data"]["alignment"], json!([[0, 0], [1, 1]]));

    let (status, body) = send(&app, get("/api/dictionary/lookup?word=hej&language=sv")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["translation"], "hello");
}

#[tokio::test]
async fn test_translator_failure_is_bad_gateway() {
    let db = common::test_db().await;
    let app = common::test_app(db.store.clone(), Arc::new(common::FailingTranslator));
    let (status, body) = send(&app, get("/api/dictionary/lookup?word=hej&language=sv")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (_db, app) = app().await;
    let (status, body) = send(&app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
