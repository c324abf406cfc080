//! Automation service — feeds published snapshots into the automation policy
//! and forwards its decisions to the motor controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use clothesline_domain::automation::{AutomationPolicy, Decision};
use clothesline_domain::command::CommandSource;
use clothesline_domain::status::StatusSnapshot;

use crate::ports::Subscription;
use crate::services::motor_controller::MotorHandle;

pub struct AutomationService {
    enabled: AtomicBool,
    policy: Mutex<AutomationPolicy>,
    motor: MotorHandle,
}

impl AutomationService {
    #[must_use]
    pub fn new(motor: MotorHandle, policy: AutomationPolicy, enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            policy: Mutex::new(policy),
            motor,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Switch the engine on or off. Returns the previous setting.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        let previous = self.enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            tracing::info!(enabled, "automation toggled");
        }
        previous
    }

    /// Evaluate one snapshot and submit the resulting command, if any.
    pub async fn on_snapshot(&self, snapshot: &StatusSnapshot) -> Decision {
        let decision = self
            .policy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .evaluate_snapshot(snapshot, self.is_enabled());

        if let Decision::Issue(kind) = decision {
            tracing::info!(
                command = %kind,
                rain = ?snapshot.rain_forecast,
                "automation issuing motor command"
            );
            if let Err(err) = self.motor.submit(kind, CommandSource::Automation).await {
                tracing::warn!(command = %kind, error = %err, "automation command not delivered");
            }
        } else {
            tracing::trace!(?decision, "automation evaluated");
        }
        decision
    }

    /// Evaluate every snapshot seen on `subscription` until it closes.
    pub fn spawn(self: Arc<Self>, mut subscription: Subscription) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(value) = subscription.next().await {
                match StatusSnapshot::from_value(value) {
                    Ok(snapshot) => {
                        self.on_snapshot(&snapshot).await;
                    }
                    Err(err) => {
                        tracing::debug!(
                            path = subscription.path(),
                            error = %err,
                            "ignoring malformed status"
                        );
                    }
                }
            }
            tracing::debug!("automation subscription closed");
        })
    }
}
