//! Symbol source abstractions and implementations.
//!
//! This module contains:
//! - The `SymbolSource` trait every snapshot source implements
//! - `HttpSymbolSource`, the REST client for the downstream service
//!
//! Sources are deliberately unaware of rate limiting and circuit breaking.
//! Those policies are applied by [`GuardedSource`](crate::registry::GuardedSource).

mod http;
mod traits;

pub use http::{HttpSourceConfig, HttpSymbolSource, DEFAULT_ENDPOINT, SOURCE_ID};
pub use traits::SymbolSource;
