//! # clothesline-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **control surface**: motor commands (`/command/{kind}`),
//!   telemetry start/stop (`/start`, `/stop`) and `/health`
//! - Expose the latest status snapshot (`/status`) and a live
//!   Server-Sent Events feed of every snapshot (`/status/stream`)
//! - Toggle the automation engine (`/automation`)
//! - Reject invalid command tokens with `400` before they reach the motor
//!   controller
//!
//! ## Dependency rule
//! Depends on `clothesline-app` (for port traits and services) and
//! `clothesline-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
