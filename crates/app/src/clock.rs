//! Monotonic millisecond clock anchored to wall time.
//!
//! Every service stamps snapshots and commands through a [`Clock`] so that the
//! stability and cooldown windows never see time go backwards, and so tests
//! can drive the whole timeline with `tokio::time::pause` / `advance`.

use std::time::Duration;

use tokio::time::Instant;

use clothesline_domain::time::{Millis, now_ms};

#[derive(Debug, Clone, Copy)]
pub struct Clock {
    anchor_ms: Millis,
    anchor: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::starting_at(now_ms())
    }
}

impl Clock {
    /// A clock reading the current wall time at creation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that reads `anchor_ms` right now.
    #[must_use]
    pub fn starting_at(anchor_ms: Millis) -> Self {
        Self {
            anchor_ms,
            anchor: Instant::now(),
        }
    }

    #[must_use]
    pub fn now_ms(&self) -> Millis {
        let elapsed = i64::try_from(self.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.anchor_ms.saturating_add(elapsed)
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn should_start_at_anchor() {
        let clock = Clock::starting_at(1_000);
        assert_eq!(clock.now_ms(), 1_000);
    }

    #[tokio::test(start_paused = true)]
    async fn should_follow_tokio_time() {
        let clock = Clock::starting_at(0);
        tokio::time::advance(Duration::from_millis(2_500)).await;
        assert_eq!(clock.now_ms(), 2_500);
    }
}
