//! Application services.
//!
//! Each service accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod automation_service;
pub mod command_listener;
pub mod motor_controller;
pub mod status_publisher;
pub mod telemetry_service;
