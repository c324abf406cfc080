//! Shared application state for axum handlers.

use std::sync::Arc;

use clothesline_app::clock::Clock;
use clothesline_app::ports::{SensorSource, SharedStore, StorePaths};
use clothesline_app::services::automation_service::AutomationService;
use clothesline_app::services::motor_controller::MotorHandle;
use clothesline_app::services::status_publisher::StatusPublisher;
use clothesline_app::services::telemetry_service::TelemetryService;

/// Application state shared across all axum handlers.
///
/// Generic over the sensor source and the shared store to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`.
pub struct AppState<Src, S> {
    /// Front door to the motor controller task.
    pub motor: MotorHandle,
    /// Periodic telemetry tick.
    pub telemetry: Arc<TelemetryService<Src, S>>,
    /// Latest snapshot and snapshot feed.
    pub publisher: Arc<StatusPublisher<S>>,
    /// Automation on/off switch.
    pub automation: Arc<AutomationService>,
    /// Store written by `PUT /command`.
    pub store: Arc<S>,
    pub paths: StorePaths,
    /// Stamps records written by `PUT /command`, shared with the controller.
    pub clock: Clock,
}

impl<Src, S> Clone for AppState<Src, S> {
    fn clone(&self) -> Self {
        Self {
            motor: self.motor.clone(),
            telemetry: Arc::clone(&self.telemetry),
            publisher: Arc::clone(&self.publisher),
            automation: Arc::clone(&self.automation),
            store: Arc::clone(&self.store),
            paths: self.paths.clone(),
            clock: self.clock,
        }
    }
}

impl<Src, S> AppState<Src, S>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    /// Create the state from services already shared with background tasks.
    pub fn new(
        motor: MotorHandle,
        telemetry: Arc<TelemetryService<Src, S>>,
        publisher: Arc<StatusPublisher<S>>,
        automation: Arc<AutomationService>,
        store: Arc<S>,
        paths: StorePaths,
        clock: Clock,
    ) -> Self {
        Self {
            motor,
            telemetry,
            publisher,
            automation,
            store,
            paths,
            clock,
        }
    }
}
