use axum::http::StatusCode;
use dialectic_core::config::Config;
use dialectic_server::{build_router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Initialize a project with its docs directory in place and return the
/// shared state, so tests can inspect the broadcaster and dispatcher.
fn init_project(dir: &TempDir) -> AppState {
    let config = Config::new("test-project");
    std::fs::create_dir_all(config.docs_dir(dir.path())).unwrap();
    config.save(dir.path()).unwrap();
    AppState::load(dir.path().to_path_buf()).unwrap()
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Read-only routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));
    let (status, body) = get(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn stats_lists_scenarios_and_clients() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));
    let (status, body) = get(app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"], "test-project");
    assert_eq!(body["connected_clients"], 0);
    assert_eq!(
        body["registered_triggers"],
        serde_json::json!(["security", "mvp", "performance", "error", "documentation"])
    );
}

#[tokio::test]
async fn config_route_returns_loaded_config() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));
    let (status, body) = get(app, "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["name"], "test-project");
    assert_eq!(body["templates"]["security"]["name"], "security_specialist");
}

#[tokio::test]
async fn counters_start_empty() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));
    let (status, body) = get(app, "/api/counters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["success_rate"], 0.0);
    assert_eq!(body["top_patterns"], serde_json::json!([]));
}

#[tokio::test]
async fn counters_report_top_templates() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));
    for scenario in ["security", "security", "mvp"] {
        let (status, _) = post_json(
            app.clone(),
            "/api/trigger",
            serde_json::json!({ "scenario": scenario }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = get(app, "/api/counters").await;
    assert_eq!(
        body["top_templates"],
        serde_json::json!([
            { "template": "security_specialist", "count": 2 },
            { "template": "mvp_strategist", "count": 1 },
        ])
    );
}

#[tokio::test]
async fn history_lists_recent_events_newest_first() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));

    let (_, body) = get(app.clone(), "/api/history").await;
    assert_eq!(body, serde_json::json!([]));

    for scenario in ["security", "error", "mvp"] {
        post_json(
            app.clone(),
            "/api/trigger",
            serde_json::json!({ "scenario": scenario }),
        )
        .await;
    }

    let (status, body) = get(app, "/api/history?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["templates"], serde_json::json!(["mvp_strategist"]));
    assert_eq!(entries[1]["pattern"], "sec:false|mvp:false|perf:false|err:true");
    assert_eq!(entries[1]["error_count"], 1);
    assert!(dir.path().join(".dialectic/history.json").exists());
}

#[tokio::test]
async fn sse_listener_is_unregistered_when_stream_drops() {
    let dir = TempDir::new().unwrap();
    let state = init_project(&dir);
    let app = build_router(state.clone());

    let req = axum::http::Request::builder()
        .uri("/api/events")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.broadcaster.listener_count(), 1);

    let (_, body) = get(app.clone(), "/api/stats").await;
    assert_eq!(body["connected_clients"], 1);

    drop(response);
    assert_eq!(state.broadcaster.listener_count(), 0);
    let (_, body) = get(app, "/api/stats").await;
    assert_eq!(body["connected_clients"], 0);
}

#[tokio::test]
async fn counters_reject_zero_top() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));
    let (status, body) = get(app, "/api/counters?top=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("top"));
}

// ---------------------------------------------------------------------------
// Pipeline routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn classify_is_pure() {
    let dir = TempDir::new().unwrap();
    let state = init_project(&dir);
    let app = build_router(state.clone());

    let (status, body) = post_json(
        app,
        "/api/classify",
        serde_json::json!({ "message": "Add JWT authentication", "files": ["auth/jwt.py"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["flags"]["security"], true);
    assert_eq!(body["analysis"]["flags"]["mvp"], false);
    assert_eq!(body["templates"], serde_json::json!(["security_specialist"]));
    assert_eq!(body["summary"], "Security (100.0%) | Complexity: Medium (11)");

    let d = state.dispatcher.lock().unwrap();
    assert_eq!(d.counter().counters().total_events, 0);
    assert!(!dir.path().join(".cursor/rules/security_rules.md").exists());
}

#[tokio::test]
async fn dispatch_writes_docs_and_counts() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));

    let (status, body) = post_json(
        app.clone(),
        "/api/dispatch",
        serde_json::json!({ "message": "Add JWT authentication", "files": ["auth/jwt.py"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["templates"], serde_json::json!(["security_specialist"]));
    assert_eq!(body["outcome"], "success");
    assert_eq!(body["persisted"], true);
    assert!(dir.path().join(".cursor/rules/security_rules.md").exists());

    let (_, counters) = get(app, "/api/counters?top=3").await;
    assert_eq!(counters["total"], 1);
    assert_eq!(
        counters["top_patterns"][0]["pattern"],
        "sec:true|mvp:false|perf:false|err:false"
    );
    assert_eq!(counters["top_patterns"][0]["count"], 1);
}

#[tokio::test]
async fn trigger_runs_canned_scenario() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));

    let (status, body) = post_json(
        app,
        "/api/trigger",
        serde_json::json!({ "scenario": "error" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["templates"], serde_json::json!(["error_handler"]));
    assert_eq!(body["analysis"]["pattern"], "sec:false|mvp:false|perf:false|err:true");
}

#[tokio::test]
async fn trigger_unknown_scenario_is_400() {
    let dir = TempDir::new().unwrap();
    let app = build_router(init_project(&dir));
    let (status, body) = post_json(
        app,
        "/api/trigger",
        serde_json::json!({ "scenario": "frontend" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("frontend"));
}

#[tokio::test]
async fn dispatch_fans_out_to_listeners() {
    let dir = TempDir::new().unwrap();
    let state = init_project(&dir);
    let app = build_router(state.clone());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    state
        .broadcaster
        .register(Arc::new(dialectic_server::state::ChannelListener::new(tx)));

    let (status, _) = post_json(
        app,
        "/api/trigger",
        serde_json::json!({ "scenario": "mvp" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut kinds = Vec::new();
    while let Ok(payload) = rx.try_recv() {
        let v: serde_json::Value = serde_json::from_str(&payload).unwrap();
        kinds.push(v["type"].as_str().unwrap().to_string());
    }
    assert_eq!(kinds.first().map(String::as_str), Some("agent_generated"));
    assert_eq!(kinds.last().map(String::as_str), Some("event_processed"));
    assert!(kinds.iter().any(|k| k == "documentation_updated"));
    assert!(kinds.iter().any(|k| k == "learning_event"));
}

#[tokio::test]
async fn closed_listener_is_dropped_on_next_dispatch() {
    let dir = TempDir::new().unwrap();
    let state = init_project(&dir);
    let app = build_router(state.clone());

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    state
        .broadcaster
        .register(Arc::new(dialectic_server::state::ChannelListener::new(tx)));
    drop(rx);
    assert_eq!(state.broadcaster.listener_count(), 1);

    let (status, _) = post_json(
        app,
        "/api/trigger",
        serde_json::json!({ "scenario": "security" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.broadcaster.listener_count(), 0);
}

#[tokio::test]
async fn missing_docs_dir_fails_before_serving() {
    let dir = TempDir::new().unwrap();
    Config::new("test-project").save(dir.path()).unwrap();
    let err = AppState::load(dir.path().to_path_buf()).err().unwrap();
    assert!(err.to_string().contains("does not exist"));
}
