//! Key-value store abstraction.
//!
//! The index and reconciliation services only talk to [`KeyValueStore`].
//! `xref-storage-redis` provides the production implementation;
//! [`MemoryStore`] is an in-process implementation for tests and local runs.

mod memory_store;
mod store_traits;

#[cfg(test)]
mod controlled_store;

pub use memory_store::MemoryStore;
pub use store_traits::KeyValueStore;

#[cfg(test)]
pub(crate) use controlled_store::ControlledStore;
