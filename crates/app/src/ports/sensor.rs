//! Sensor port — where telemetry samples come from.
//!
//! The only implementation today is the simulator adapter; a hardware
//! bridge would implement the same trait.

use clothesline_domain::telemetry::TelemetrySample;
use clothesline_domain::time::Millis;

/// A source of periodic telemetry samples.
pub trait SensorSource: Send {
    /// Produce the sample for instant `now_ms`.
    fn sample(&mut self, now_ms: Millis) -> TelemetrySample;
}

impl<T: SensorSource + ?Sized> SensorSource for Box<T> {
    fn sample(&mut self, now_ms: Millis) -> TelemetrySample {
        (**self).sample(now_ms)
    }
}
