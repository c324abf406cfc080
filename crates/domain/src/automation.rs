//! Automation policy — decides, without human input, when to move the line.
//!
//! The rain forecast flips with sampling noise. Two windows keep the actuator
//! from chattering:
//! - **stability**: the forecast must hold for [`DEFAULT_STABILITY_MS`];
//! - **cooldown**: at least [`DEFAULT_COOLDOWN_MS`] since the last automated action.
//!
//! The policy is evaluated on every published snapshot and owns its window
//! state exclusively.

use serde::{Deserialize, Serialize};

use crate::command::MotorCommandKind;
use crate::motor::{MotorState, Position};
use crate::stability::StabilityWindow;
use crate::status::StatusSnapshot;
use crate::time::Millis;

pub const DEFAULT_STABILITY_MS: Millis = 10_000;
pub const DEFAULT_COOLDOWN_MS: Millis = 45_000;

/// What the policy concluded for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "command")]
pub enum Decision {
    /// Automation is switched off.
    Disabled,
    /// The motor is travelling; nothing is evaluated.
    MotorRunning,
    /// The snapshot carries no forecast yet.
    NoForecast,
    /// The forecast changed less than the stability window ago.
    Unstable,
    /// The last action was less than the cooldown ago.
    CoolingDown,
    /// The line is already where the forecast wants it.
    NothingToDo,
    /// Send this command to the motor controller.
    Issue(MotorCommandKind),
}

/// `{ last_forecast_change_at, last_action_at, current_forecast }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomationPolicy {
    stability: StabilityWindow,
    cooldown: StabilityWindow,
    current_forecast: Option<bool>,
}

impl Default for AutomationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STABILITY_MS, DEFAULT_COOLDOWN_MS)
    }
}

impl AutomationPolicy {
    #[must_use]
    pub fn new(stability_ms: Millis, cooldown_ms: Millis) -> Self {
        Self {
            stability: StabilityWindow::new(stability_ms),
            cooldown: StabilityWindow::new(cooldown_ms),
            current_forecast: None,
        }
    }

    #[must_use]
    pub fn current_forecast(&self) -> Option<bool> {
        self.current_forecast
    }

    #[must_use]
    pub fn last_forecast_change_at(&self) -> Option<Millis> {
        self.stability.last_change_at()
    }

    #[must_use]
    pub fn last_action_at(&self) -> Option<Millis> {
        self.cooldown.last_change_at()
    }

    /// Evaluate a published snapshot, using its own timestamp as `now`.
    pub fn evaluate_snapshot(&mut self, snapshot: &StatusSnapshot, enabled: bool) -> Decision {
        self.evaluate(
            enabled,
            snapshot.motor(),
            snapshot.rain_forecast,
            snapshot.timestamp_ms,
        )
    }

    /// Evaluate one observation.
    ///
    /// When a command is issued the cooldown restarts at `now` immediately,
    /// whether or not the command later completes.
    pub fn evaluate(
        &mut self,
        enabled: bool,
        motor: MotorState,
        forecast: Option<bool>,
        now: Millis,
    ) -> Decision {
        if !enabled {
            return Decision::Disabled;
        }
        if motor.running() {
            return Decision::MotorRunning;
        }
        let Some(forecast) = forecast else {
            return Decision::NoForecast;
        };

        if self.current_forecast != Some(forecast) {
            self.current_forecast = Some(forecast);
            self.stability.mark(now);
        }

        if !self.stability.stable(now) {
            return Decision::Unstable;
        }
        if !self.cooldown.stable(now) {
            return Decision::CoolingDown;
        }

        let command = match (forecast, motor.position) {
            (true, Position::Extended) => MotorCommandKind::Retract,
            (false, Position::Retracted) => MotorCommandKind::Extend,
            _ => return Decision::NothingToDo,
        };
        self.cooldown.mark(now);
        Decision::Issue(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::Direction;

    fn idle(position: Position) -> MotorState {
        MotorState {
            position,
            direction: None,
        }
    }

    #[test]
    fn should_skip_when_disabled() {
        let mut policy = AutomationPolicy::default();
        let decision = policy.evaluate(false, idle(Position::Extended), Some(true), 100_000);
        assert_eq!(decision, Decision::Disabled);
        assert_eq!(policy.current_forecast(), None);
    }

    #[test]
    fn should_skip_when_motor_running() {
        let mut policy = AutomationPolicy::default();
        let motor = MotorState {
            position: Position::Extended,
            direction: Some(Direction::Retracting),
        };
        assert_eq!(
            policy.evaluate(true, motor, Some(true), 0),
            Decision::MotorRunning
        );
    }

    #[test]
    fn should_wait_when_snapshot_has_no_forecast() {
        let mut policy = AutomationPolicy::default();
        assert_eq!(
            policy.evaluate(true, idle(Position::Retracted), None, 0),
            Decision::NoForecast
        );
    }

    #[test]
    fn should_not_act_during_first_ten_seconds_after_forecast_change() {
        let mut policy = AutomationPolicy::default();
        for now in (0..10_000).step_by(1_000) {
            assert_eq!(
                policy.evaluate(true, idle(Position::Extended), Some(true), now),
                Decision::Unstable
            );
        }
    }

    #[test]
    fn should_retract_when_rain_forecast_is_stable() {
        let mut policy = AutomationPolicy::default();
        policy.evaluate(true, idle(Position::Extended), Some(true), 0);
        let decision = policy.evaluate(true, idle(Position::Extended), Some(true), 10_000);
        assert_eq!(decision, Decision::Issue(MotorCommandKind::Retract));
        assert_eq!(policy.last_action_at(), Some(10_000));
    }

    #[test]
    fn should_extend_when_clear_forecast_is_stable() {
        let mut policy = AutomationPolicy::default();
        policy.evaluate(true, idle(Position::Retracted), Some(false), 0);
        let decision = policy.evaluate(true, idle(Position::Retracted), Some(false), 12_000);
        assert_eq!(decision, Decision::Issue(MotorCommandKind::Extend));
    }

    #[test]
    fn should_do_nothing_when_line_already_matches_forecast() {
        let mut policy = AutomationPolicy::default();
        policy.evaluate(true, idle(Position::Retracted), Some(true), 0);
        assert_eq!(
            policy.evaluate(true, idle(Position::Retracted), Some(true), 20_000),
            Decision::NothingToDo
        );
        assert_eq!(policy.last_action_at(), None);
    }

    #[test]
    fn should_restart_stability_window_when_forecast_flips() {
        let mut policy = AutomationPolicy::default();
        policy.evaluate(true, idle(Position::Extended), Some(true), 0);
        policy.evaluate(true, idle(Position::Extended), Some(false), 8_000);
        assert_eq!(policy.last_forecast_change_at(), Some(8_000));
        assert_eq!(
            policy.evaluate(true, idle(Position::Extended), Some(true), 12_000),
            Decision::Unstable
        );
    }

    #[test]
    fn should_respect_cooldown_after_an_action() {
        let mut policy = AutomationPolicy::default();
        policy.evaluate(true, idle(Position::Retracted), Some(false), 0);
        assert_eq!(
            policy.evaluate(true, idle(Position::Retracted), Some(false), 10_000),
            Decision::Issue(MotorCommandKind::Extend)
        );
        // the run finished, rain arrives and holds; cooldown still gates
        policy.evaluate(true, idle(Position::Extended), Some(true), 16_000);
        assert_eq!(
            policy.evaluate(true, idle(Position::Extended), Some(true), 30_000),
            Decision::CoolingDown
        );
        assert_eq!(
            policy.evaluate(true, idle(Position::Extended), Some(true), 55_000),
            Decision::Issue(MotorCommandKind::Retract)
        );
    }

    #[test]
    fn should_never_issue_two_commands_within_cooldown_under_flapping_forecast() {
        let mut policy = AutomationPolicy::default();
        let mut position = Position::Retracted;
        let mut issued = Vec::new();

        for step in 0..600_i64 {
            let now = step * 1_000;
            // flips every second for two minutes, then settles into long runs
            let forecast = if now < 120_000 {
                step % 2 == 0
            } else {
                (now / 60_000) % 2 == 0
            };
            if let Decision::Issue(command) =
                policy.evaluate(true, idle(position), Some(forecast), now)
            {
                issued.push(now);
                position = match command {
                    MotorCommandKind::Extend => Position::Extended,
                    _ => Position::Retracted,
                };
            }
        }

        assert!(!issued.is_empty());
        for pair in issued.windows(2) {
            assert!(pair[1] - pair[0] >= DEFAULT_COOLDOWN_MS);
        }
        // nothing can fire while the forecast flips every second
        assert!(issued.iter().all(|&at| at >= 120_000));
    }

    #[test]
    fn should_evaluate_snapshot_with_its_own_timestamp() {
        let mut policy = AutomationPolicy::default();
        let first = StatusSnapshot::compose(idle(Position::Retracted), None, Some(false), 1_000);
        let later = StatusSnapshot::compose(idle(Position::Retracted), None, Some(false), 11_000);
        assert_eq!(policy.evaluate_snapshot(&first, true), Decision::Unstable);
        assert_eq!(
            policy.evaluate_snapshot(&later, true),
            Decision::Issue(MotorCommandKind::Extend)
        );
    }
}
