//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ClotheslineError`] via `#[from]` at the port boundary.

/// Base error type shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum ClotheslineError {
    /// Input rejected at the boundary before it reached any state machine.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The shared store failed to read or write.
    #[error("store error")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A background service is no longer running (usually during shutdown).
    #[error("{0} is unavailable")]
    Unavailable(&'static str),
}

impl ClotheslineError {
    /// Wrap any adapter error as a [`ClotheslineError::Store`].
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }
}

/// Invalid input detected at an ingress boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The token is not one of `EXTEND`, `RETRACT`, `IDLE`.
    #[error("invalid command {0:?}, expected one of EXTEND, RETRACT, IDLE")]
    InvalidCommand(String),

    /// A store path must be absolute and non-empty.
    #[error("invalid store path {0:?}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_with_from() {
        let err: ClotheslineError = ValidationError::InvalidCommand("JUMP".to_string()).into();
        assert!(matches!(
            err,
            ClotheslineError::Validation(ValidationError::InvalidCommand(_))
        ));
    }

    #[test]
    fn should_mention_token_when_command_is_invalid() {
        let err = ValidationError::InvalidCommand("jump".to_string());
        assert_eq!(
            err.to_string(),
            "invalid command \"jump\", expected one of EXTEND, RETRACT, IDLE"
        );
    }

    #[test]
    fn should_wrap_adapter_error_as_store_error() {
        let io = std::io::Error::other("disk on fire");
        let err = ClotheslineError::store(io);
        assert!(matches!(err, ClotheslineError::Store(_)));
        assert_eq!(err.to_string(), "store error");
    }

    #[test]
    fn should_name_the_unavailable_service() {
        let err = ClotheslineError::Unavailable("motor controller");
        assert_eq!(err.to_string(), "motor controller is unavailable");
    }
}
