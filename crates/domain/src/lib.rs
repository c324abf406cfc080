//! # clothesline-domain
//!
//! Pure domain model for the retractable clothesline controller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, millisecond timestamps
//! - Define **Commands** (`EXTEND`, `RETRACT`, `IDLE`) and where they came from
//! - Define the **Motor** state machine as a total function over
//!   `(state, command) → (state, effects)`
//! - Define **Telemetry** samples and the bounded rolling history
//! - Define the **Rain** predictor (pure, deterministic)
//! - Define the **Stability window** hysteresis primitive shared by the
//!   humidity oscillator and the automation policy
//! - Define the **Automation** policy (stability + cooldown gating)
//! - Define the externally visible **Status** snapshot
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod automation;
pub mod command;
pub mod humidity;
pub mod motor;
pub mod rain;
pub mod stability;
pub mod status;
pub mod telemetry;
