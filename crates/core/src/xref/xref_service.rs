use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info};
use xref_source::{CircuitBreaker, SOURCE_ID};

use super::{CrossReferenceServiceTrait, ServiceHealth};
use crate::constants::LOOKUP_SCOPE;
use crate::errors::Result;
use crate::index::SymbolIndex;
use crate::lookup::{invalid_response, LookupOutcome, LookupRequest, LookupResponse, LookupService};
use crate::reconcile::{ReconcileReport, ReconciliationService};
use crate::symbols::SymbolRecord;

/// Default [`CrossReferenceServiceTrait`] implementation.
///
/// Manual edits go straight to the index and are not coordinated with
/// reconciliation: the next pass may overwrite them.
pub struct CrossReferenceService {
    index: Arc<SymbolIndex>,
    lookup: LookupService,
    reconciler: Arc<ReconciliationService>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl CrossReferenceService {
    /// `circuit_breaker` is the breaker shared by the lookup and downstream
    /// scopes; it is only read here, for health reporting.
    pub fn new(
        index: Arc<SymbolIndex>,
        lookup: LookupService,
        reconciler: Arc<ReconciliationService>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            index,
            lookup,
            reconciler,
            circuit_breaker,
        }
    }

    pub fn reconciler(&self) -> &Arc<ReconciliationService> {
        &self.reconciler
    }
}

#[async_trait]
impl CrossReferenceServiceTrait for CrossReferenceService {
    async fn lookup_symbol(&self, id_type: &str, id_value: &str) -> Result<LookupOutcome> {
        self.lookup.lookup_raw(id_type, id_value).await
    }

    async fn batch_lookup(&self, requests: &[LookupRequest]) -> Vec<LookupResponse> {
        debug!("Batch lookup of {} identifiers", requests.len());
        let lookups = requests
            .iter()
            .map(|req| self.lookup.lookup_raw(&req.id_type, &req.id_value));

        join_all(lookups)
            .await
            .into_iter()
            .map(|result| match result {
                Ok(outcome) => outcome.to_response(),
                Err(e) => invalid_response(e.to_string()),
            })
            .collect()
    }

    async fn add_symbol(&self, record: SymbolRecord) -> Result<()> {
        self.index.put(&record).await
    }

    async fn update_symbol(&self, old: SymbolRecord, new: SymbolRecord) -> Result<()> {
        self.index.replace(&old, &new).await
    }

    async fn delete_symbol(&self, symbol_id: &str) -> Result<bool> {
        self.index.remove(symbol_id).await
    }

    async fn refresh_cache(&self) -> Result<ReconcileReport> {
        info!("Manual cache refresh requested");
        self.reconciler.reconcile().await
    }

    fn health(&self) -> ServiceHealth {
        ServiceHealth::from_metrics(self.circuit_breaker.metrics(), &[LOOKUP_SCOPE, SOURCE_ID])
    }
}
