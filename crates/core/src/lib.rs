//! Symbol cross-reference core.
//!
//! This crate resolves instrument identifiers (ISIN, CUSIP, SEDOL, ticker,
//! Bloomberg ID) to canonical symbol records held in a key-value store, and
//! keeps that store aligned with the downstream source of truth.
//!
//! It is storage-agnostic: the store is reached through the
//! [`store::KeyValueStore`] trait, implemented by `xref-storage-redis` in
//! production and by [`store::MemoryStore`] in tests.
//!
//! ```text
//!  lookup ──▶ LookupService ──┐
//!                             ├──▶ SymbolIndex ──▶ KeyValueStore
//!  refresh ─▶ ReconciliationService ─┘
//!                   │
//!                   └──▶ DownstreamClient ──▶ xref-source (GuardedSource)
//! ```

pub mod constants;
pub mod downstream;
pub mod errors;
pub mod index;
pub mod lookup;
pub mod reconcile;
pub mod store;
pub mod symbols;
pub mod xref;

// Re-export error types
pub use errors::{Error, Result};

pub use symbols::{IdentifierType, IndexKey, SymbolRecord};
