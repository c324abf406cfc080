//! Telemetry — sensor samples and the bounded rolling history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::time::Millis;

/// Longest span of samples the history keeps.
pub const HISTORY_WINDOW_MS: Millis = 60_000;

/// One sensor reading. Immutable once produced.
///
/// Missing fields deserialize as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySample {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Light level in % (LDR).
    pub light_level: f64,
    /// Tank water level in %.
    pub water_level: f64,
    pub timestamp_ms: Millis,
}

/// Rolling window of recent samples, oldest first.
///
/// Appending a sample evicts everything older than `window_ms` relative to
/// the newest sample.
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    samples: VecDeque<TelemetrySample>,
    window_ms: Millis,
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::new(HISTORY_WINDOW_MS)
    }
}

impl TelemetryHistory {
    /// Create a history keeping at most `window_ms` of samples (capped at 60 s).
    #[must_use]
    pub fn new(window_ms: Millis) -> Self {
        Self {
            samples: VecDeque::new(),
            window_ms: window_ms.clamp(0, HISTORY_WINDOW_MS),
        }
    }

    pub fn push(&mut self, sample: TelemetrySample) {
        self.samples.push_back(sample);
        let cutoff = sample.timestamp_ms.saturating_sub(self.window_ms);
        while self
            .samples
            .front()
            .is_some_and(|oldest| oldest.timestamp_ms < cutoff)
        {
            self.samples.pop_front();
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    /// Contiguous copy of the samples, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<TelemetrySample> {
        self.samples.iter().copied().collect()
    }
}
