//! Status snapshot — the externally visible, derived, read-only view.
//!
//! A snapshot is recomputed from scratch and published whole; it is never
//! partially updated.

use serde::{Deserialize, Serialize};

use crate::motor::{Direction, MotorState, Position};
use crate::telemetry::TelemetrySample;
use crate::time::{Millis, Timestamp, from_ms};

/// Union of motor state, the latest telemetry sample, and the rain forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub system_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ldr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_forecast: Option<bool>,
    pub clothesline_status: String,
    pub motor_status: String,
    pub led_indicator: String,
    pub running: bool,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub timestamp: Timestamp,
    pub timestamp_ms: Millis,
}

impl StatusSnapshot {
    /// Assemble a snapshot. All fields are computed before anything is written.
    #[must_use]
    pub fn compose(
        motor: MotorState,
        telemetry: Option<&TelemetrySample>,
        rain_forecast: Option<bool>,
        at_ms: Millis,
    ) -> Self {
        Self {
            system_status: "Active".to_string(),
            temperature: telemetry.map(|s| round_to_tenth(s.temperature)),
            humidity: telemetry.map(|s| s.humidity.round()),
            ldr: telemetry.map(|s| s.light_level.round()),
            water_level: telemetry.map(|s| s.water_level.round()),
            rain_forecast,
            clothesline_status: motor.line_label().to_string(),
            motor_status: motor.motor_label().to_string(),
            led_indicator: "Connected".to_string(),
            running: motor.running(),
            position: motor.position,
            direction: motor.direction,
            timestamp: from_ms(at_ms),
            timestamp_ms: at_ms,
        }
    }

    /// The motor state this snapshot was composed from.
    #[must_use]
    pub fn motor(&self) -> MotorState {
        MotorState {
            position: self.position,
            direction: self.direction,
        }
    }

    /// Serialize for a store write.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; unreachable for finite readings.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Parse a value read from the store.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error when the value is not a snapshot.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
