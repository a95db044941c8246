//! Error types and retry classification for the source crate.
//!
//! This module provides:
//! - [`SourceError`]: The error enum for every snapshot fetch failure
//! - [`RetryClass`]: Classification deciding circuit breaker bookkeeping

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching the downstream snapshot.
///
/// Every variant means "the snapshot is unavailable". None of them may be
/// interpreted as an empty universe by a caller.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The downstream answered with a non-success status or could not be reached.
    #[error("Source unavailable: {source_id} - {message}")]
    Unavailable {
        /// The source that failed
        source_id: String,
        /// Description of the failure
        message: String,
    },

    /// The downstream rate limited the request (HTTP 429).
    #[error("Rate limited: {source_id}")]
    RateLimited {
        /// The source that rate limited the request
        source_id: String,
    },

    /// The request to the downstream timed out.
    #[error("Timeout: {source_id}")]
    Timeout {
        /// The source that timed out
        source_id: String,
    },

    /// The circuit breaker is open for this source; the call was not made.
    #[error("Circuit open: {source_id}")]
    CircuitOpen {
        /// The source with an open circuit
        source_id: String,
    },

    /// The downstream answered but the body could not be decoded.
    #[error("Invalid payload from {source_id}: {message}")]
    InvalidPayload {
        /// The source that returned the payload
        source_id: String,
        /// Decoder error message
        message: String,
    },

    /// The source is misconfigured (e.g. an unparsable endpoint URL).
    #[error("Source misconfigured: {0}")]
    Configuration(String),

    /// A network error occurred while talking to the downstream.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SourceError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use xref_source::errors::{RetryClass, SourceError};
    ///
    /// let error = SourceError::Timeout { source_id: "DOWNSTREAM".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithPenalty);
    ///
    /// let error = SourceError::CircuitOpen { source_id: "DOWNSTREAM".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::CircuitOpen);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Configuration(_) => RetryClass::Never,

            Self::Unavailable { .. }
            | Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::InvalidPayload { .. }
            | Self::Network(_) => RetryClass::WithPenalty,

            Self::CircuitOpen { .. } => RetryClass::CircuitOpen,
        }
    }

    /// True when the call was refused locally by the circuit breaker.
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }
}
