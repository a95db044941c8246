//! Core error types.
//!
//! This module defines store-agnostic error types. Store-specific errors
//! (Redis replies, connection failures) are converted to these types by the
//! storage crate.

use thiserror::Error;
use xref_source::SourceError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the cross-reference service.
///
/// A lookup miss is not an error; it is `Ok(None)` or
/// [`LookupOutcome::NotFound`](crate::lookup::LookupOutcome::NotFound).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The store or the downstream could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record '{symbol_id}': {message}")]
    CorruptRecord { symbol_id: String, message: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True for failures caused by an unreachable store or downstream.
    ///
    /// These are recoverable and answered with the degraded-mode response.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::Unavailable(_)
                | Error::Store(StoreError::ConnectionFailed(_))
                | Error::Store(StoreError::CommandFailed(_))
        )
    }

    /// True for malformed input rejected before any store access.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        Error::Unavailable(err.to_string())
    }
}

/// Store-agnostic error type for key-value operations.
///
/// Uses `String` payloads so the storage layer can convert its own error
/// types into this format.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// A command was sent but failed (I/O error, timeout, server error).
    #[error("Store command failed: {0}")]
    CommandFailed(String),

    /// The store answered with a reply of the wrong shape (e.g. WRONGTYPE).
    #[error("Unexpected store reply: {0}")]
    UnexpectedReply(String),
}

/// Input validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown identifier type '{0}'")]
    UnknownIdentifierType(String),

    #[error("Identifier value must not be empty")]
    EmptyIdentifierValue,

    #[error("Symbol id must not be empty")]
    EmptySymbolId,

    #[error("Old and new records refer to different symbols: '{old}' vs '{new}'")]
    SymbolIdMismatch { old: String, new: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_transport_errors_are_unavailable() {
        assert!(Error::from(StoreError::ConnectionFailed("refused".into())).is_unavailable());
        assert!(Error::from(StoreError::CommandFailed("timeout".into())).is_unavailable());
        assert!(!Error::from(StoreError::UnexpectedReply("WRONGTYPE".into())).is_unavailable());
    }

    #[test]
    fn test_source_errors_map_to_unavailable() {
        let err: Error = SourceError::CircuitOpen {
            source_id: "DOWNSTREAM".to_string(),
        }
        .into();
        assert!(err.is_unavailable());
        assert_eq!(
            err.to_string(),
            "Service unavailable: Circuit open: DOWNSTREAM"
        );
    }

    #[test]
    fn test_validation_is_invalid() {
        let err: Error = ValidationError::EmptyIdentifierValue.into();
        assert!(err.is_invalid());
        assert!(!err.is_unavailable());
    }
}
