//! Latest status snapshot.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use clothesline_app::ports::{SensorSource, SharedStore};
use clothesline_domain::status::StatusSnapshot;

use crate::state::AppState;

pub enum GetResponse {
    Ok(Json<StatusSnapshot>),
    NotPublished,
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::NotPublished => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "no status published yet" })),
            )
                .into_response(),
        }
    }
}

/// `GET /status` — the last snapshot written to the store.
pub async fn latest<Src, S>(State(state): State<AppState<Src, S>>) -> GetResponse
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    match state.publisher.latest() {
        Some(snapshot) => GetResponse::Ok(Json(snapshot)),
        None => GetResponse::NotPublished,
    }
}
