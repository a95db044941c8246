//! Resilience wrapper around a [`SymbolSource`].
//!
//! Every fetch goes through the same steps:
//! 1. Check the circuit breaker; refuse with [`SourceError::CircuitOpen`] when open
//! 2. Wait for a rate limiter token
//! 3. Fetch the snapshot
//! 4. Record the outcome according to the error's [`RetryClass`]

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::{CircuitBreaker, CircuitState, RateLimiter, ScopeId};
use crate::errors::{RetryClass, SourceError};
use crate::models::SourceSymbol;
use crate::provider::SymbolSource;

/// A [`SymbolSource`] guarded by a rate limiter and a circuit breaker.
///
/// The guarded source is itself a `SymbolSource`, so callers do not need to
/// know whether they talk to a raw or a guarded source. It never converts a
/// failure into an empty snapshot.
pub struct GuardedSource {
    inner: Arc<dyn SymbolSource>,
    rate_limiter: Arc<RateLimiter>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl GuardedSource {
    /// Guard `inner` with default policies.
    pub fn new(inner: Arc<dyn SymbolSource>) -> Self {
        Self::with_policies(
            inner,
            Arc::new(RateLimiter::new()),
            Arc::new(CircuitBreaker::new()),
        )
    }

    /// Guard `inner` with caller-provided (possibly shared) policies.
    pub fn with_policies(
        inner: Arc<dyn SymbolSource>,
        rate_limiter: Arc<RateLimiter>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            inner,
            rate_limiter,
            circuit_breaker,
        }
    }

    fn scope(&self) -> ScopeId {
        Cow::Borrowed(self.inner.id())
    }

    /// Current circuit state of the wrapped source.
    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state(&self.scope())
    }

    /// The circuit breaker guarding this source.
    pub fn circuit_breaker(&self) -> &Arc<CircuitBreaker> {
        &self.circuit_breaker
    }
}

#[async_trait]
impl SymbolSource for GuardedSource {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn fetch_all_symbols(&self) -> Result<Vec<SourceSymbol>, SourceError> {
        let scope = self.scope();

        if !self.circuit_breaker.is_allowed(&scope) {
            warn!("Circuit breaker open for source '{}', short-circuiting", scope);
            return Err(SourceError::CircuitOpen {
                source_id: scope.to_string(),
            });
        }

        self.rate_limiter.acquire(&scope).await;

        match self.inner.fetch_all_symbols().await {
            Ok(symbols) => {
                self.circuit_breaker.record_success(&scope);
                info!(
                    "Fetched {} symbols from source '{}'",
                    symbols.len(),
                    scope
                );
                Ok(symbols)
            }
            Err(e) => {
                match e.retry_class() {
                    RetryClass::WithPenalty => {
                        self.circuit_breaker.record_failure(&scope);
                        warn!(
                            "Source '{}' failed with {}, recorded circuit breaker failure",
                            scope, e
                        );
                    }
                    RetryClass::Never | RetryClass::CircuitOpen => {
                        debug!("Source '{}' failed with {}, no penalty", scope, e);
                    }
                }
                Err(e)
            }
        }
    }
}
