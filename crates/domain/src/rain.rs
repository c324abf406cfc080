//! Rain predictor — maps the latest sample and a short history to a forecast.
//!
//! Heuristic: rain is expected when the mean humidity over the last 10 s is
//! at least 75 % and the latest temperature is at most 30 °C.
//!
//! Sample age is measured against `latest.timestamp_ms`, not the wall clock,
//! so the same inputs always produce the same answer.

use crate::telemetry::TelemetrySample;
use crate::time::Millis;

/// Samples older than this (relative to the latest) are not averaged.
pub const AVERAGING_WINDOW_MS: Millis = 10_000;
/// Mean humidity at or above which rain is likely.
pub const HUMIDITY_THRESHOLD: f64 = 75.0;
/// Temperature at or below which rain is likely.
pub const TEMPERATURE_CEILING: f64 = 30.0;

/// Forecast rain for `latest` given recent `history`.
#[must_use]
pub fn predict(latest: &TelemetrySample, history: &[TelemetrySample]) -> bool {
    let mean_humidity = mean_recent_humidity(latest, history);
    mean_humidity >= HUMIDITY_THRESHOLD && latest.temperature <= TEMPERATURE_CEILING
}

/// Mean humidity of the samples no older than [`AVERAGING_WINDOW_MS`].
///
/// Falls back to `latest.humidity` when no sample qualifies.
#[must_use]
pub fn mean_recent_humidity(latest: &TelemetrySample, history: &[TelemetrySample]) -> f64 {
    let (sum, count) = history
        .iter()
        .filter(|sample| {
            let age = latest.timestamp_ms.saturating_sub(sample.timestamp_ms);
            (0..=AVERAGING_WINDOW_MS).contains(&age)
        })
        .fold((0.0_f64, 0_u32), |(sum, count), sample| {
            (sum + sample.humidity, count + 1)
        });

    if count == 0 {
        latest.humidity
    } else {
        sum / f64::from(count)
    }
}
