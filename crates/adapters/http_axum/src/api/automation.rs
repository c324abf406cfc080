//! Automation on/off switch.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use clothesline_app::ports::{SensorSource, SharedStore};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AutomationSetting {
    pub enabled: bool,
}

/// `GET /automation`
pub async fn get<Src, S>(State(state): State<AppState<Src, S>>) -> Json<AutomationSetting>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    Json(AutomationSetting {
        enabled: state.automation.is_enabled(),
    })
}

/// `PUT /automation` — switch the decision engine on or off.
pub async fn update<Src, S>(
    State(state): State<AppState<Src, S>>,
    Json(body): Json<AutomationSetting>,
) -> Json<AutomationSetting>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    state.automation.set_enabled(body.enabled);
    Json(AutomationSetting {
        enabled: state.automation.is_enabled(),
    })
}
