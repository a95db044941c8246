use std::borrow::Cow;
use std::sync::Arc;

use log::{debug, warn};
use xref_source::{CircuitBreaker, CircuitState, RateLimiter, ScopeId};

use super::LookupOutcome;
use crate::constants::LOOKUP_SCOPE;
use crate::errors::{Result, ValidationError};
use crate::index::SymbolIndex;
use crate::symbols::{normalize_identifier, IdentifierType};

/// Identifier lookups with rate limiting and a circuit breaker.
///
/// Store outages are answered with [`LookupOutcome::Degraded`] instead of an
/// error, and repeated outages open the circuit so the store is left alone
/// until it has had time to recover.
pub struct LookupService {
    index: Arc<SymbolIndex>,
    rate_limiter: Arc<RateLimiter>,
    circuit_breaker: Arc<CircuitBreaker>,
    scope: ScopeId,
}

impl LookupService {
    pub fn new(
        index: Arc<SymbolIndex>,
        rate_limiter: Arc<RateLimiter>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            index,
            rate_limiter,
            circuit_breaker,
            scope: Cow::Borrowed(LOOKUP_SCOPE),
        }
    }

    /// Resolve an identifier to its full record.
    ///
    /// Only malformed input yields `Err`; every store-related condition maps
    /// to an outcome.
    pub async fn lookup(&self, id_type: IdentifierType, value: &str) -> Result<LookupOutcome> {
        if normalize_identifier(value).is_none() {
            return Err(ValidationError::EmptyIdentifierValue.into());
        }

        if !self.rate_limiter.try_acquire(&self.scope) {
            warn!("Lookup rate limit exceeded for {}={}", id_type, value);
            return Ok(LookupOutcome::RateLimited);
        }

        if !self.circuit_breaker.is_allowed(&self.scope) {
            debug!("Lookup circuit open, skipping store for {}={}", id_type, value);
            return Ok(LookupOutcome::Degraded {
                reason: "Circuit open".to_string(),
            });
        }

        match self.resolve_record(id_type, value).await {
            Ok(outcome) => {
                self.circuit_breaker.record_success(&self.scope);
                Ok(outcome)
            }
            Err(e) if e.is_unavailable() => {
                self.circuit_breaker.record_failure(&self.scope);
                warn!("Lookup for {}={} degraded: {}", id_type, value, e);
                Ok(LookupOutcome::Degraded {
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`lookup`](Self::lookup), parsing the identifier type first.
    pub async fn lookup_raw(&self, id_type: &str, value: &str) -> Result<LookupOutcome> {
        let id_type: IdentifierType = id_type.parse()?;
        self.lookup(id_type, value).await
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state(&self.scope)
    }

    async fn resolve_record(&self, id_type: IdentifierType, value: &str) -> Result<LookupOutcome> {
        let Some(symbol_id) = self.index.resolve(id_type, value).await? else {
            debug!("No symbol for {}={}", id_type, value);
            return Ok(LookupOutcome::NotFound);
        };

        match self.index.get_record(&symbol_id).await? {
            Some(record) => Ok(LookupOutcome::Found(record)),
            None => {
                // Removed between the two reads.
                debug!(
                    "{}={} resolved to {} but the record is gone",
                    id_type, value, symbol_id
                );
                Ok(LookupOutcome::NotFound)
            }
        }
    }
}
