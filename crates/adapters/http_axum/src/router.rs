//! Axum router assembly.

use axum::Router;
use tower_http::trace::TraceLayer;

use clothesline_app::ports::{SensorSource, SharedStore};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<Src, S>(state: AppState<Src, S>) -> Router
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    crate::api::routes::<Src, S>()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
