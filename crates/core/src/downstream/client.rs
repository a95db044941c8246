//! Downstream Client - Facade for the xref-source crate.
//!
//! Converts source-level symbols and errors into core types.
//!
//! ```text
//! ReconciliationService ─▶ DownstreamClient ─▶ GuardedSource ─▶ HttpSymbolSource
//!                               │
//!               SymbolRecord ◀──┴── convert ◀── SourceSymbol
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};

use xref_source::{
    CircuitBreaker, GuardedSource, HttpSourceConfig, HttpSymbolSource, RateLimiter,
    SourceSymbol, SymbolSource,
};

use super::SnapshotProvider;
use crate::errors::Result;
use crate::symbols::SymbolRecord;

impl From<SourceSymbol> for SymbolRecord {
    fn from(symbol: SourceSymbol) -> Self {
        SymbolRecord {
            symbol_id: symbol.symbol_id,
            isin: symbol.isin,
            cusip: symbol.cusip,
            sedol: symbol.sedol,
            ticker: symbol.ticker,
            bloomberg_id: symbol.bloomberg_id,
            name: symbol.name,
            additional_attributes: symbol.additional_attributes.unwrap_or_default(),
        }
    }
}

/// [`SnapshotProvider`] backed by a [`SymbolSource`].
pub struct DownstreamClient {
    source: Arc<dyn SymbolSource>,
}

impl DownstreamClient {
    pub fn new(source: Arc<dyn SymbolSource>) -> Self {
        Self { source }
    }

    /// Build a client over the HTTP source, guarded by the given policies.
    pub fn http(
        config: HttpSourceConfig,
        rate_limiter: Arc<RateLimiter>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self> {
        let http = HttpSymbolSource::new(config)?;
        let guarded = GuardedSource::with_policies(Arc::new(http), rate_limiter, circuit_breaker);
        Ok(Self::new(Arc::new(guarded)))
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }
}

#[async_trait]
impl SnapshotProvider for DownstreamClient {
    async fn fetch_snapshot(&self) -> Result<Vec<SymbolRecord>> {
        match self.source.fetch_all_symbols().await {
            Ok(symbols) => {
                debug!(
                    "Received {} symbols from '{}'",
                    symbols.len(),
                    self.source.id()
                );
                Ok(symbols.into_iter().map(SymbolRecord::from).collect())
            }
            Err(e) => {
                error!("Failed to fetch symbols from '{}': {}", self.source.id(), e);
                Err(e.into())
            }
        }
    }
}
