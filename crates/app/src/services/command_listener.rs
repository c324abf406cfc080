//! Command listener — the store-subscription ingress channel.
//!
//! Watches the command record and forwards every recognised `motor` value,
//! with its `updatedAt` stamp, to the controller. Acknowledgments written back
//! by the controller arrive here too and are dropped by the controller as
//! stale, however late they are delivered.

use serde_json::Value;
use tokio::task::JoinHandle;

use clothesline_domain::command::CommandRecord;

use crate::ports::Subscription;
use crate::services::motor_controller::{CommandOutcome, MotorHandle};

pub struct CommandListener {
    motor: MotorHandle,
}

impl CommandListener {
    #[must_use]
    pub fn new(motor: MotorHandle) -> Self {
        Self { motor }
    }

    /// Handle one observed command record.
    ///
    /// Returns `None` when the value carries no valid command or the
    /// controller is gone.
    pub async fn on_value(&self, value: &Value) -> Option<CommandOutcome> {
        let Some(kind) = CommandRecord::command_kind(value) else {
            tracing::debug!(%value, "ignoring unrecognised command record");
            return None;
        };
        let stamp = CommandRecord::stamp(value);
        match self.motor.submit_record(kind, stamp).await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::warn!(command = %kind, error = %err, "store command not delivered");
                None
            }
        }
    }

    /// Forward every value seen on `subscription` until it closes.
    pub fn spawn(self, mut subscription: Subscription) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(value) = subscription.next().await {
                self.on_value(&value).await;
            }
            tracing::debug!(path = subscription.path(), "command subscription closed");
        })
    }
}
