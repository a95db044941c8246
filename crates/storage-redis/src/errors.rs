//! Storage-specific error types for Redis operations.
//!
//! Wraps `redis` errors and converts them to the store-agnostic types
//! defined in `xref_core`.

use redis::{ErrorKind, RedisError};
use thiserror::Error;
use xref_core::errors::{Error, StoreError};

/// Storage-specific errors.
///
/// Internal to the storage layer; converted to `xref_core::Error` before
/// being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid Redis URL: {0}")]
    InvalidUrl(String),

    #[error("Redis command failed: {0}")]
    Redis(#[from] RedisError),

    #[error("Redis command timed out after {0} ms")]
    Timeout(u64),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidUrl(msg) => Error::Store(StoreError::ConnectionFailed(msg)),
            StorageError::Timeout(ms) => Error::Store(StoreError::CommandFailed(format!(
                "timed out after {} ms",
                ms
            ))),
            StorageError::Redis(e) => {
                if e.is_connection_refusal() || e.is_connection_dropped() {
                    Error::Store(StoreError::ConnectionFailed(e.to_string()))
                } else if e.kind() == ErrorKind::TypeError || e.code() == Some("WRONGTYPE") {
                    Error::Store(StoreError::UnexpectedReply(e.to_string()))
                } else {
                    Error::Store(StoreError::CommandFailed(e.to_string()))
                }
            }
        }
    }
}

/// Extension trait for converting Redis results to core results.
pub trait IntoCore<T> {
    fn into_core(self) -> xref_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, RedisError> {
    fn into_core(self) -> xref_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, StorageError> {
    fn into_core(self) -> xref_core::Result<T> {
        self.map_err(Error::from)
    }
}
