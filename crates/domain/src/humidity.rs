//! Humidity mode — the slow half of the two-timescale telemetry signal.
//!
//! The simulated humidity alternates between a WET and a DRY band. The band
//! holds for a randomized dwell time so downstream automation sees a signal
//! that is noisy sample-to-sample but persistent over tens of seconds.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::stability::StabilityWindow;
use crate::time::Millis;

/// Dwell before the first flip.
pub const INITIAL_DWELL_MS: Millis = 30_000;
/// Bounds of the randomized dwell after each flip.
pub const DWELL_RANGE_MS: RangeInclusive<Millis> = 25_000..=45_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HumidityMode {
    Wet,
    #[default]
    Dry,
}

impl HumidityMode {
    /// Humidity band (%) sampled while in this mode.
    #[must_use]
    pub fn band(self) -> RangeInclusive<f64> {
        match self {
            Self::Wet => 78.0..=86.0,
            Self::Dry => 55.0..=65.0,
        }
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Wet => Self::Dry,
            Self::Dry => Self::Wet,
        }
    }
}

/// `{ mode, next_switch_at }`, mutated only by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumidityOscillator {
    mode: HumidityMode,
    window: StabilityWindow,
}

impl HumidityOscillator {
    /// Start in DRY mode, flipping [`INITIAL_DWELL_MS`] after `now`.
    #[must_use]
    pub fn new(now: Millis) -> Self {
        Self {
            mode: HumidityMode::Dry,
            window: StabilityWindow::marked_at(INITIAL_DWELL_MS, now),
        }
    }

    #[must_use]
    pub fn mode(&self) -> HumidityMode {
        self.mode
    }

    /// Instant of the next scheduled flip.
    #[must_use]
    pub fn next_switch_at(&self) -> Millis {
        self.window.stable_at().unwrap_or_default()
    }

    /// Advance to `now`, flipping the mode if the dwell has elapsed.
    ///
    /// `next_dwell` is only called on a flip and supplies the dwell until the
    /// following one (the simulator draws it uniformly from [`DWELL_RANGE_MS`]).
    pub fn tick(&mut self, now: Millis, next_dwell: impl FnOnce() -> Millis) -> HumidityMode {
        if self.window.stable(now) {
            self.mode = self.mode.flipped();
            self.window.rearm(now, next_dwell());
        }
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_dry_and_switch_after_initial_dwell() {
        let osc = HumidityOscillator::new(1_000);
        assert_eq!(osc.mode(), HumidityMode::Dry);
        assert_eq!(osc.next_switch_at(), 31_000);
    }

    #[test]
    fn should_hold_mode_before_switch_time() {
        let mut osc = HumidityOscillator::new(0);
        let mode = osc.tick(29_999, || panic!("dwell must not be drawn without a flip"));
        assert_eq!(mode, HumidityMode::Dry);
    }

    #[test]
    fn should_flip_and_rearm_when_switch_time_reached() {
        let mut osc = HumidityOscillator::new(0);
        let mode = osc.tick(30_000, || 40_000);
        assert_eq!(mode, HumidityMode::Wet);
        assert_eq!(osc.next_switch_at(), 70_000);
    }

    #[test]
    fn should_flip_back_after_rearmed_dwell() {
        let mut osc = HumidityOscillator::new(0);
        osc.tick(30_000, || 25_000);
        assert_eq!(osc.tick(54_999, || 25_000), HumidityMode::Wet);
        assert_eq!(osc.tick(55_000, || 25_000), HumidityMode::Dry);
    }

    #[test]
    fn should_use_disjoint_bands_for_wet_and_dry() {
        let wet = HumidityMode::Wet.band();
        let dry = HumidityMode::Dry.band();
        assert!(dry.end() < wet.start());
        assert_eq!((*wet.start(), *wet.end()), (78.0, 86.0));
        assert_eq!((*dry.start(), *dry.end()), (55.0, 65.0));
    }
}
