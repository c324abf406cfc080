//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the services and the
//! adapters can depend on them without creating circular dependencies.

pub mod sensor;
pub mod store;

pub use sensor::SensorSource;
pub use store::{SharedStore, StorePaths, Subscription};
