//! # clothesline-app
//!
//! Application layer — services and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `SharedStore` — realtime key/value store (`write`, `merge`, `read`, `subscribe`)
//!   - `SensorSource` — produces telemetry samples
//! - Provide the **services** that give the domain a timeline:
//!   - `MotorController` — single-task command serialization boundary that
//!     owns the motor state machine and its completion timer
//!   - `StatusPublisher` — composes and writes whole status snapshots
//!   - `TelemetryService` — periodic sensor tick, rolling history, forecast
//!   - `AutomationService` — store subscription → automation policy → controller
//!   - `CommandListener` — store subscription → controller
//!
//! ## Dependency rule
//! Depends on `clothesline-domain` only (plus `tokio` for tasks, timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod clock;
pub mod ports;
pub mod services;

#[cfg(test)]
mod test_support;
