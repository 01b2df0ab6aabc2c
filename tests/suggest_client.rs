//! Integration tests for the HTTP move-suggestion client.
//!
//! Spins up a stand-in suggestion service on an OS-assigned port and points
//! `HttpSuggester` (and the full API) at it.

use std::collections::HashMap;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use board_rules::api::router::create_router;
use board_rules::api::state::AppState;
use board_rules::config::AppConfig;
use board_rules::suggest::{HttpSuggester, MoveSuggester, SuggestError};

const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";

/// Helper: serve `app` on an OS-assigned port, return its base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", addr.port())
}

/// A fake engine that answers e7e5 for the position after 1.e4 and reports
/// checkmate for anything else. It echoes the FEN back for inspection.
async fn start_fake_engine() -> String {
    async fn make_move(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let fen = params.get("fen").cloned().unwrap_or_default();
        if fen == AFTER_E4 {
            Json(json!({"from": "e7", "to": "e5", "score": 0.3, "checkmate": false, "fen": fen}))
        } else {
            Json(json!({"from": "", "to": "", "score": 100.0, "checkmate": true}))
        }
    }

    let app = Router::new().route("/engine/make_move", get(make_move));
    format!("{}/engine", serve(app).await)
}

fn suggester(base: &str) -> HttpSuggester {
    HttpSuggester::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn suggest_sends_fen_and_parses_reply() {
    let base = start_fake_engine().await;
    let s = suggester(&base).suggest(AFTER_E4).await.unwrap();
    assert_eq!(s.from, "e7");
    assert_eq!(s.to, "e5");
    assert_eq!(s.score, 0.3);
    assert!(!s.checkmate);
    assert_eq!(s.to_move().unwrap().to_string(), "e7e5");
}

#[tokio::test]
async fn checkmate_reply_is_an_error() {
    let base = start_fake_engine().await;
    let err = suggester(&base)
        .suggest("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
        .await
        .unwrap_err();
    assert!(matches!(err, SuggestError::Checkmate));
}

#[tokio::test]
async fn upstream_error_status() {
    let app = Router::new().route(
        "/engine/make_move",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = format!("{}/engine", serve(app).await);
    let err = suggester(&base).suggest(AFTER_E4).await.unwrap_err();
    assert!(matches!(err, SuggestError::UpstreamStatus(_)));
}

#[tokio::test]
async fn unparsable_reply() {
    let app = Router::new().route("/engine/make_move", get(|| async { "not json" }));
    let base = format!("{}/engine", serve(app).await);
    let err = suggester(&base).suggest(AFTER_E4).await.unwrap_err();
    assert!(matches!(err, SuggestError::ParseError(_)));
}

#[tokio::test]
async fn connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = suggester(&format!("http://127.0.0.1:{port}/engine"))
        .suggest(AFTER_E4)
        .await
        .unwrap_err();
    assert!(matches!(err, SuggestError::RequestFailed(_)));
}

#[tokio::test]
async fn engine_move_end_to_end() {
    let engine = start_fake_engine().await;
    let config = AppConfig {
        engine_url: engine,
        engine_timeout_ms: 5_000,
        ..AppConfig::default()
    };
    let api = serve(create_router(AppState::new(config))).await;
    let client = reqwest::Client::new();

    let game: Value = client
        .post(format!("{api}/api/games"))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = game["id"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{api}/api/games/{id}/moves"))
        .json(&json!({"from": "e2", "to": "e4"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = client
        .post(format!("{api}/api/games/{id}/engine-move"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["move"]["from"], "e7");
    assert_eq!(body["move"]["to"], "e5");
    assert_eq!(body["engineScore"], 0.3);
    assert_eq!(
        body["fen"],
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
    );

    // Now White is to move in a position the fake engine calls checkmate.
    let resp = client
        .post(format!("{api}/api/games/{id}/engine-move"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);
}
