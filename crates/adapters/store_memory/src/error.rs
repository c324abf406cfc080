//! Store-specific error type.

use clothesline_domain::error::ClotheslineError;

/// Errors originating from the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Paths are absolute, like `/clothesline/command`.
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    /// `merge` needs an object on both sides.
    #[error("cannot merge into non-object value at {0}")]
    NotAnObject(String),

    /// The store was switched offline.
    #[error("store is offline")]
    Offline,
}

impl From<StoreError> for ClotheslineError {
    fn from(err: StoreError) -> Self {
        Self::store(err)
    }
}
