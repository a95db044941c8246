//! Redis storage implementation for the symbol cross-reference service.
//!
//! This crate implements the [`KeyValueStore`](xref_core::store::KeyValueStore)
//! trait from `xref-core` on top of a Redis [`ConnectionManager`], which
//! reconnects transparently after connection loss.
//!
//! # Architecture
//!
//! This crate is the only place where the `redis` dependency exists. The
//! core crate is storage-agnostic and works with the trait.
//!
//! ```text
//!      core (index, reconcile, lookup)
//!                  │
//!                  ▼
//!       storage-redis (this crate)
//!                  │
//!                  ▼
//!                Redis
//! ```
//!
//! [`ConnectionManager`]: redis::aio::ConnectionManager

pub mod errors;
pub mod store;

pub use errors::{IntoCore, StorageError};
pub use store::{RedisStore, RedisStoreConfig};

// Re-export from xref-core for convenience
pub use xref_core::errors::{Error, Result, StoreError};
