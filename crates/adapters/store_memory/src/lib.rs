//! # clothesline-adapter-store-memory
//!
//! In-process realtime key/value store.
//!
//! ## Responsibilities
//! - Implement the `SharedStore` port defined in `clothesline-app::ports::store`
//! - Hold one JSON value per absolute path (`/clothesline/status`, ...)
//! - Notify subscribers of every change on the path they watch
//!
//! ## Dependency rule
//! Depends on `clothesline-app` (for port traits) and `clothesline-domain` (for error types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod store;

pub use error::StoreError;
pub use store::InMemoryStore;
