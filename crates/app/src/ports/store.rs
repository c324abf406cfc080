//! Shared store port — the realtime key/value store mirrored by the core.
//!
//! The store is a best-effort mirror: the motor controller is the source of
//! truth, and a failed write never rolls back in-memory state.

use std::future::Future;

use serde_json::Value;
use tokio::sync::broadcast;

use clothesline_domain::error::{ClotheslineError, ValidationError};

/// Realtime store with per-path change notifications.
pub trait SharedStore: Send + Sync {
    /// Replace the value at `path`.
    fn write(
        &self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), ClotheslineError>> + Send;

    /// Shallow-merge the keys of `partial` into the object at `path`.
    ///
    /// A `null` key removes that key.
    fn merge(
        &self,
        path: &str,
        partial: Value,
    ) -> impl Future<Output = Result<(), ClotheslineError>> + Send;

    /// Read the current value at `path`.
    fn read(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<Value>, ClotheslineError>> + Send;

    /// Subscribe to changes at `path`.
    ///
    /// The subscription yields the current value first (if any), then every
    /// subsequent value at least once.
    fn subscribe(&self, path: &str) -> Subscription;
}

impl<T: SharedStore> SharedStore for std::sync::Arc<T> {
    fn write(
        &self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), ClotheslineError>> + Send {
        (**self).write(path, value)
    }

    fn merge(
        &self,
        path: &str,
        partial: Value,
    ) -> impl Future<Output = Result<(), ClotheslineError>> + Send {
        (**self).merge(path, partial)
    }

    fn read(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<Value>, ClotheslineError>> + Send {
        (**self).read(path)
    }

    fn subscribe(&self, path: &str) -> Subscription {
        (**self).subscribe(path)
    }
}

/// A stream of values observed at one store path.
pub struct Subscription {
    path: String,
    initial: Option<Value>,
    receiver: broadcast::Receiver<Value>,
}

impl Subscription {
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        initial: Option<Value>,
        receiver: broadcast::Receiver<Value>,
    ) -> Self {
        Self {
            path: path.into(),
            initial,
            receiver,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait for the next value. Returns `None` once the store is gone.
    ///
    /// A slow subscriber that falls behind skips the values it missed.
    pub async fn next(&mut self) -> Option<Value> {
        if let Some(value) = self.initial.take() {
            return Some(value);
        }
        loop {
            match self.receiver.recv().await {
                Ok(value) => return Some(value),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(path = %self.path, skipped, "store subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// The two store paths used by the core, under a common root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    root: String,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self {
            root: "/clothesline".to_string(),
        }
    }
}

impl StorePaths {
    /// Build paths under `root` (e.g. `/clothesline`).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPath`] unless `root` starts with `/`
    /// and names something below the store root.
    pub fn new(root: &str) -> Result<Self, ValidationError> {
        let trimmed = root.trim_end_matches('/');
        if !trimmed.starts_with('/') || trimmed.len() < 2 {
            return Err(ValidationError::InvalidPath(root.to_string()));
        }
        Ok(Self {
            root: trimmed.to_string(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Status snapshots (write-only from the core).
    #[must_use]
    pub fn status(&self) -> String {
        format!("{}/status", self.root)
    }

    /// Command record (read by the core, written by HTTP and automation).
    #[must_use]
    pub fn command(&self) -> String {
        format!("{}/command", self.root)
    }
}
