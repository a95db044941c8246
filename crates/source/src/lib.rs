//! Downstream symbol source crate.
//!
//! This crate fetches the authoritative symbol universe from the downstream
//! service and wraps the call in a caller-side resilience policy.
//!
//! # Architecture
//!
//! ```text
//!   reconciliation (xref-core)
//!              |
//!              v
//!     +------------------+
//!     |   GuardedSource  |  circuit breaker + rate limiter
//!     +------------------+
//!              |
//!              v
//!     +------------------+
//!     |   SymbolSource   |  (HttpSymbolSource, test doubles)
//!     +------------------+
//!              |
//!              v
//!        downstream API
//! ```
//!
//! A short-circuited or failed fetch is always surfaced as an error
//! ([`SourceError::CircuitOpen`], [`SourceError::Unavailable`], ...). The
//! guarded source never substitutes an empty snapshot for a failure, so a
//! caller can tell "the downstream has no symbols" apart from "the downstream
//! could not be asked".

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::{RetryClass, SourceError};
pub use models::SourceSymbol;
pub use provider::{HttpSourceConfig, HttpSymbolSource, SymbolSource, DEFAULT_ENDPOINT, SOURCE_ID};
pub use registry::{
    CircuitBreaker, CircuitBreakerConfig, CircuitMetrics, CircuitState, GuardedSource,
    RateLimitConfig, RateLimiter, ScopeId,
};
