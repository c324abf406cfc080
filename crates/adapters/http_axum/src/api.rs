//! JSON API handler modules.

pub mod automation;
#[allow(clippy::missing_errors_doc)]
pub mod command;
pub mod health;
pub mod sse;
pub mod status;
pub mod telemetry;

use axum::Router;
use axum::routing::{get, post, put};

use clothesline_app::ports::{SensorSource, SharedStore};

use crate::state::AppState;

/// Build the API routes.
pub fn routes<Src, S>() -> Router<AppState<Src, S>>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    Router::new()
        .route("/health", get(health::check))
        // Telemetry tick
        .route("/start", post(telemetry::start::<Src, S>))
        .route("/stop", post(telemetry::stop::<Src, S>))
        // Motor
        .route("/command", put(command::write::<Src, S>))
        .route("/command/{kind}", post(command::submit::<Src, S>))
        // Status
        .route("/status", get(status::latest::<Src, S>))
        .route("/status/stream", get(sse::stream::<Src, S>))
        // Automation
        .route(
            "/automation",
            get(automation::get::<Src, S>).put(automation::update::<Src, S>),
        )
}
