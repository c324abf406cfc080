//! Motor command handlers.
//!
//! `POST /command/{kind}` drives the controller directly and waits for the
//! result. `PUT /command` only writes the store's command record, the same
//! way the dashboard does, and lets the subscription pick it up.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use clothesline_app::ports::{SensorSource, SharedStore};
use clothesline_domain::command::{CommandRecord, CommandSource, MotorCommandKind};
use clothesline_domain::motor::Position;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of a successful `POST /command/{kind}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult {
    pub ok: bool,
    pub accepted: bool,
    pub motor: MotorCommandKind,
    pub running: bool,
    pub position: Position,
}

/// Body of `PUT /command`.
#[derive(Debug, Deserialize)]
pub struct WriteCommand {
    pub motor: String,
}

pub enum SubmitResponse {
    Ok(Json<CommandResult>),
}

impl IntoResponse for SubmitResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum WriteResponse {
    Accepted(Json<CommandRecord>),
}

impl IntoResponse for WriteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `POST /command/{kind}` — apply a command through the motor controller.
pub async fn submit<Src, S>(
    State(state): State<AppState<Src, S>>,
    Path(kind): Path<String>,
) -> Result<SubmitResponse, ApiError>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    let kind: MotorCommandKind = kind.parse()?;
    let outcome = state.motor.submit(kind, CommandSource::Http).await?;
    Ok(SubmitResponse::Ok(Json(CommandResult {
        ok: true,
        accepted: outcome.accepted(),
        motor: kind,
        running: outcome.state.running(),
        position: outcome.state.position,
    })))
}

/// `PUT /command` — merge a command record into the store.
///
/// The record carries no `source`, which clears the previous writer's tag.
pub async fn write<Src, S>(
    State(state): State<AppState<Src, S>>,
    Json(body): Json<WriteCommand>,
) -> Result<WriteResponse, ApiError>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    let kind: MotorCommandKind = body.motor.parse()?;
    let record = CommandRecord::new(kind, state.clock.now_ms());
    state
        .store
        .merge(&state.paths.command(), record.to_value())
        .await?;
    tracing::debug!(command = %kind, "command record written");
    Ok(WriteResponse::Accepted(Json(record)))
}
