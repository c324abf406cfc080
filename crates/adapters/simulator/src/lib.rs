//! # clothesline-adapter-simulator
//!
//! Simulated clothesline sensors, standing in for the physical board.
//!
//! ## Signals
//!
//! | Field | Range | Behaviour |
//! |-------|-------|-----------|
//! | `temperature` | 24.0 – 30.0 °C | uniform, one decimal |
//! | `humidity` | WET 78 – 86 %, DRY 55 – 65 % | uniform within the current mode's band |
//! | `light_level` | 20 – 100 % | uniform integer |
//! | `water_level` | 30 – 80 % | uniform integer |
//!
//! Humidity mode starts DRY and first flips 30 s after the first sample, then
//! dwells 25 – 45 s per mode.
//!
//! ## Dependency rule
//!
//! Depends on `clothesline-app` (port traits) and `clothesline-domain` only.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use clothesline_app::ports::SensorSource;
use clothesline_domain::humidity::{DWELL_RANGE_MS, HumidityMode, HumidityOscillator};
use clothesline_domain::telemetry::TelemetrySample;
use clothesline_domain::time::Millis;

/// Sensor simulator with a persistent humidity cycle.
pub struct SimulatedSensor<R = StdRng> {
    rng: R,
    oscillator: Option<HumidityOscillator>,
}

impl SimulatedSensor<StdRng> {
    /// A simulator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A reproducible simulator.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulatedSensor<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            oscillator: None,
        }
    }

    /// Current humidity mode, or `None` before the first sample.
    #[must_use]
    pub fn mode(&self) -> Option<HumidityMode> {
        self.oscillator.as_ref().map(HumidityOscillator::mode)
    }
}

impl<R: Rng + Send> SensorSource for SimulatedSensor<R> {
    fn sample(&mut self, now_ms: Millis) -> TelemetrySample {
        let rng = &mut self.rng;
        let oscillator = self
            .oscillator
            .get_or_insert_with(|| HumidityOscillator::new(now_ms));
        let previous = oscillator.mode();
        let mode = oscillator.tick(now_ms, || rng.gen_range(DWELL_RANGE_MS));
        if mode != previous {
            tracing::info!(
                ?mode,
                next_switch_at = oscillator.next_switch_at(),
                "humidity mode switched"
            );
        }

        TelemetrySample {
            temperature: (rng.gen_range(24.0..=30.0_f64) * 10.0).round() / 10.0,
            humidity: rng.gen_range(mode.band()).round(),
            light_level: f64::from(rng.gen_range(20_u8..=100)),
            water_level: f64::from(rng.gen_range(30_u8..=80)),
            timestamp_ms: now_ms,
        }
    }
}
