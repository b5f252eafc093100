use axum::extract::{Query, State};
use axum::Json;
use dialectic_core::counter::CounterSummary;
use dialectic_core::history::HistoryEntry;
use dialectic_core::scenario::Scenario;

use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_TOP: usize = 5;
const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(serde::Deserialize)]
pub struct CountersQuery {
    top: Option<usize>,
}

/// GET /api/counters?top=n: totals, success rate and the `n` most frequent
/// patterns.
pub async fn get_counters(
    State(app): State<AppState>,
    Query(query): Query<CountersQuery>,
) -> Result<Json<CounterSummary>, AppError> {
    let top = query.top.unwrap_or(DEFAULT_TOP);
    if top == 0 {
        return Err(AppError::bad_request("top must be at least 1"));
    }
    let dispatcher = app.dispatcher.clone();
    let summary = tokio::task::spawn_blocking(move || {
        dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .summary(top)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(summary))
}

#[derive(serde::Deserialize)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

/// GET /api/history?limit=n: the most recent processed events, newest first.
pub async fn get_history(
    State(app): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let dispatcher = app.dispatcher.clone();
    let entries = tokio::task::spawn_blocking(move || {
        dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .history()
            .recent(limit)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(entries))
}

/// GET /api/stats: connection and scenario overview for the dashboard.
pub async fn get_stats(State(app): State<AppState>) -> Json<serde_json::Value> {
    let scenarios: Vec<&str> = Scenario::all().iter().map(|s| s.as_str()).collect();
    Json(serde_json::json!({
        "project": app.config.project.name,
        "connected_clients": app.broadcaster.listener_count(),
        "registered_triggers": scenarios,
        "docs_dir": app.config.docs_dir(&app.root).display().to_string(),
    }))
}

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
