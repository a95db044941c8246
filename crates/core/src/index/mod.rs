//! Identifier index over the key-value store.

mod index_service;
mod key_locks;


pub use index_service::{SymbolIndex, UpsertOutcome};
pub use key_locks::{KeyLockGuard, KeyLocks};
