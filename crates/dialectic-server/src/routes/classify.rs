use axum::extract::State;
use axum::Json;
use dialectic_core::event::Event;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/classify: flags, pattern and selected templates for an event,
/// without writing anything or touching the counters.
pub async fn classify_event(
    State(app): State<AppState>,
    Json(event): Json<Event>,
) -> Result<Json<serde_json::Value>, AppError> {
    let dispatcher = app.dispatcher.clone();
    let result = tokio::task::spawn_blocking(move || {
        let d = dispatcher.lock().unwrap_or_else(|e| e.into_inner());
        let analysis = d.classifier().analyze(&event);
        let templates: Vec<String> = d
            .selector()
            .select(&analysis.flags)
            .into_iter()
            .map(|t| t.name)
            .collect();
        serde_json::json!({
            "summary": analysis.summary(),
            "analysis": analysis,
            "templates": templates,
        })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(Json(result))
}
