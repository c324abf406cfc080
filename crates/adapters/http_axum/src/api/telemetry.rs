//! Telemetry tick control.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use clothesline_app::ports::{SensorSource, SharedStore};
use clothesline_app::services::telemetry_service::StartOutcome;

use crate::state::AppState;

/// `POST /start` — start the periodic tick (publishes once right away).
pub async fn start<Src, S>(State(state): State<AppState<Src, S>>) -> Json<Value>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    match state.telemetry.start().await {
        StartOutcome::Started { interval_ms } => Json(json!({
            "started": true,
            "intervalMs": interval_ms,
        })),
        StartOutcome::AlreadyRunning => Json(json!({ "running": true })),
    }
}

/// `POST /stop` — stop the periodic tick.
pub async fn stop<Src, S>(State(state): State<AppState<Src, S>>) -> Json<Value>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    state.telemetry.stop().await;
    Json(json!({ "stopped": true }))
}
