//! Resilience policies for downstream calls.
//!
//! This module provides:
//! - Rate limiting per scope (token bucket)
//! - Circuit breaking per scope (sliding failure-rate window)
//! - [`GuardedSource`], which applies both around a symbol source

mod circuit_breaker;
mod guarded;
mod rate_limiter;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitMetrics, CircuitState, ScopeId};
pub use guarded::GuardedSource;
pub use rate_limiter::{RateLimitConfig, RateLimiter};
