//! Stability window — a debounced timer with a re-armable minimum duration.
//!
//! The same primitive backs three rules:
//! - the humidity oscillator (randomized re-arm after every mode flip),
//! - the automation stability window (signal unchanged for 10 s),
//! - the automation cooldown (45 s since the last physical action).

use serde::{Deserialize, Serialize};

use crate::time::Millis;

/// `{ last_change_at, min_stable_ms }` with a [`stable`](Self::stable) predicate.
///
/// A window that has never been marked is stable: there is nothing to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityWindow {
    last_change_at: Option<Millis>,
    min_stable_ms: Millis,
}

impl StabilityWindow {
    #[must_use]
    pub fn new(min_stable_ms: Millis) -> Self {
        Self {
            last_change_at: None,
            min_stable_ms,
        }
    }

    /// A window that was last marked at `at`.
    #[must_use]
    pub fn marked_at(min_stable_ms: Millis, at: Millis) -> Self {
        Self {
            last_change_at: Some(at),
            min_stable_ms,
        }
    }

    /// Record a change at `now`, restarting the window.
    pub fn mark(&mut self, now: Millis) {
        self.last_change_at = Some(now);
    }

    /// Record a change at `now` and use a new minimum duration from here on.
    pub fn rearm(&mut self, now: Millis, min_stable_ms: Millis) {
        self.last_change_at = Some(now);
        self.min_stable_ms = min_stable_ms;
    }

    /// Whether at least `min_stable_ms` have elapsed since the last change.
    #[must_use]
    pub fn stable(&self, now: Millis) -> bool {
        self.last_change_at
            .is_none_or(|at| now.saturating_sub(at) >= self.min_stable_ms)
    }

    #[must_use]
    pub fn last_change_at(&self) -> Option<Millis> {
        self.last_change_at
    }

    #[must_use]
    pub fn min_stable_ms(&self) -> Millis {
        self.min_stable_ms
    }

    /// The instant the window becomes stable, if it has ever been marked.
    #[must_use]
    pub fn stable_at(&self) -> Option<Millis> {
        self.last_change_at
            .map(|at| at.saturating_add(self.min_stable_ms))
    }
}
