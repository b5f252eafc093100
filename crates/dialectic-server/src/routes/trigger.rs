use axum::extract::State;
use axum::Json;
use dialectic_core::event::Event;
use dialectic_core::pipeline::DispatchReport;
use dialectic_core::scenario::Scenario;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct TriggerBody {
    scenario: String,
}

/// POST /api/trigger: run a canned scenario, same as a dashboard button.
pub async fn trigger_scenario(
    State(app): State<AppState>,
    Json(body): Json<TriggerBody>,
) -> Result<Json<DispatchReport>, AppError> {
    let scenario: Scenario = body.scenario.parse()?;
    tracing::info!(%scenario, "triggered scenario");
    let report = app.run_event(scenario.event()).await?;
    Ok(Json(report))
}

/// POST /api/dispatch: run a caller-supplied event through the pipeline.
pub async fn dispatch_event(
    State(app): State<AppState>,
    Json(event): Json<Event>,
) -> Result<Json<DispatchReport>, AppError> {
    let report = app.run_event(event).await?;
    Ok(Json(report))
}
