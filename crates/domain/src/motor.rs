//! Motor — the actuator state machine.
//!
//! The machine has four observable phases:
//!
//! | Phase | `running` | `position` |
//! |-------|-----------|------------|
//! | [`MotorPhase::IdleRetracted`] | no | retracted |
//! | [`MotorPhase::IdleExtended`] | no | extended |
//! | [`MotorPhase::RunningExtending`] | yes | unchanged until completion |
//! | [`MotorPhase::RunningRetracting`] | yes | unchanged until completion |
//!
//! [`MotorMachine::handle`] is a total function over `(state, command)`: it
//! never fails, it returns a [`Transition`] whose [`Effects`] tell the owner
//! which timer and publish actions to perform. The completion timer itself
//! lives outside the domain; [`MotorMachine::complete`] is called when it fires.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::MotorCommandKind;

/// Time the motor needs to travel from one end to the other.
pub const DEFAULT_TRAVEL_MS: u64 = 5_000;

/// Resting position of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Extended,
    #[default]
    Retracted,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extended => f.write_str("extended"),
            Self::Retracted => f.write_str("retracted"),
        }
    }
}

/// Direction of an in-flight run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Extending,
    Retracting,
}

impl Direction {
    /// The position reached when a run in this direction completes.
    #[must_use]
    pub fn target(self) -> Position {
        match self {
            Self::Extending => Position::Extended,
            Self::Retracting => Position::Retracted,
        }
    }

    /// The direction a command asks for, `None` for `IDLE`.
    #[must_use]
    pub fn for_command(kind: MotorCommandKind) -> Option<Self> {
        match kind {
            MotorCommandKind::Extend => Some(Self::Extending),
            MotorCommandKind::Retract => Some(Self::Retracting),
            MotorCommandKind::Idle => None,
        }
    }
}

/// The four phases of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotorPhase {
    IdleRetracted,
    IdleExtended,
    RunningExtending,
    RunningRetracting,
}

/// Snapshot of the actuator.
///
/// `position` only changes when a run completes; an interrupted run leaves it
/// where it was before the run started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MotorState {
    pub position: Position,
    pub direction: Option<Direction>,
}

impl MotorState {
    /// Whether the motor is currently travelling.
    #[must_use]
    pub fn running(&self) -> bool {
        self.direction.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> MotorPhase {
        match (self.direction, self.position) {
            (Some(Direction::Extending), _) => MotorPhase::RunningExtending,
            (Some(Direction::Retracting), _) => MotorPhase::RunningRetracting,
            (None, Position::Extended) => MotorPhase::IdleExtended,
            (None, Position::Retracted) => MotorPhase::IdleRetracted,
        }
    }

    /// Human-readable line status (`Extending`, `Retracting`, `Extended`, `Retracted`).
    #[must_use]
    pub fn line_label(&self) -> &'static str {
        match self.phase() {
            MotorPhase::RunningExtending => "Extending",
            MotorPhase::RunningRetracting => "Retracting",
            MotorPhase::IdleExtended => "Extended",
            MotorPhase::IdleRetracted => "Retracted",
        }
    }

    /// Motor status label (`RUNNING` or `STOPPED`).
    #[must_use]
    pub fn motor_label(&self) -> &'static str {
        if self.running() { "RUNNING" } else { "STOPPED" }
    }
}

/// Why a command left the machine unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Same value as the last processed command.
    Duplicate,
    /// A run in the requested direction is already in flight.
    AlreadyRunning,
    /// Idle at the position the command asks for.
    AlreadyAtTarget,
    /// `IDLE` while nothing is running.
    AlreadyIdle,
    /// A store record stamped no later than a command already handled.
    Stale,
}

/// Outcome of feeding one command into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A run started (or was redirected) in the given direction.
    Started(Direction),
    /// A run was interrupted; the line stays at the given position.
    Stopped(Position),
    /// Nothing changed.
    Ignored(IgnoreReason),
}

/// Side effects the owner of the machine must perform, in order:
/// cancel the pending timer, start a new one, publish status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effects {
    pub cancel_timer: bool,
    pub start_timer: bool,
    pub publish: bool,
}

impl Transition {
    /// Whether the command changed the machine's state.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }

    #[must_use]
    pub fn effects(&self) -> Effects {
        match self {
            Self::Started(_) => Effects {
                cancel_timer: true,
                start_timer: true,
                publish: true,
            },
            Self::Stopped(_) => Effects {
                cancel_timer: true,
                start_timer: false,
                publish: true,
            },
            Self::Ignored(_) => Effects::default(),
        }
    }
}

/// The motor state machine plus the dedup memory shared by every ingress channel.
#[derive(Debug, Clone, Default)]
pub struct MotorMachine {
    state: MotorState,
    last_processed: Option<MotorCommandKind>,
}

impl MotorMachine {
    /// A machine at rest in the retracted position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> MotorState {
        self.state
    }

    /// The last command value that made it past deduplication.
    #[must_use]
    pub fn last_processed(&self) -> Option<MotorCommandKind> {
        self.last_processed
    }

    /// Apply a command.
    ///
    /// A command equal to the last processed one is dropped: while running it
    /// would retrigger the in-flight run, while idle it is an echo of an
    /// acknowledgment. Finished and interrupted runs both reset the last
    /// processed value to `IDLE`, so the next identical command after a run
    /// is evaluated as a fresh transition.
    pub fn handle(&mut self, kind: MotorCommandKind) -> Transition {
        if self.last_processed == Some(kind) {
            return Transition::Ignored(if self.state.running() {
                IgnoreReason::AlreadyRunning
            } else {
                IgnoreReason::Duplicate
            });
        }
        self.last_processed = Some(kind);

        match (Direction::for_command(kind), self.state.direction) {
            (None, None) => Transition::Ignored(IgnoreReason::AlreadyIdle),
            (None, Some(_)) => {
                self.state.direction = None;
                Transition::Stopped(self.state.position)
            }
            (Some(wanted), Some(current)) if wanted == current => {
                Transition::Ignored(IgnoreReason::AlreadyRunning)
            }
            (Some(wanted), None) if wanted.target() == self.state.position => {
                Transition::Ignored(IgnoreReason::AlreadyAtTarget)
            }
            (Some(wanted), _) => {
                self.state.direction = Some(wanted);
                Transition::Started(wanted)
            }
        }
    }

    /// The completion timer fired: settle at the target of the running direction.
    ///
    /// Returns the new position, or `None` when nothing was running (a stale
    /// timer, which the owner should never produce).
    pub fn complete(&mut self) -> Option<Position> {
        let direction = self.state.direction.take()?;
        self.state.position = direction.target();
        self.last_processed = Some(MotorCommandKind::Idle);
        Some(self.state.position)
    }
}
