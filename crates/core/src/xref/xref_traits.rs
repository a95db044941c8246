use async_trait::async_trait;

use super::ServiceHealth;
use crate::errors::Result;
use crate::lookup::{LookupOutcome, LookupRequest, LookupResponse};
use crate::reconcile::ReconcileReport;
use crate::symbols::SymbolRecord;

/// Trait for cross-reference operations.
#[async_trait]
pub trait CrossReferenceServiceTrait: Send + Sync {
    /// Look up a symbol by identifier type name and value.
    async fn lookup_symbol(&self, id_type: &str, id_value: &str) -> Result<LookupOutcome>;

    /// Look up several identifiers. Each entry gets its own response, in order.
    async fn batch_lookup(&self, requests: &[LookupRequest]) -> Vec<LookupResponse>;

    /// Store a record and index its identifiers.
    async fn add_symbol(&self, record: SymbolRecord) -> Result<()>;

    /// Replace `old` with `new`, retracting identifiers `new` no longer carries.
    async fn update_symbol(&self, old: SymbolRecord, new: SymbolRecord) -> Result<()>;

    /// Remove a symbol. Returns whether it was stored.
    async fn delete_symbol(&self, symbol_id: &str) -> Result<bool>;

    /// Run a reconciliation pass now.
    async fn refresh_cache(&self) -> Result<ReconcileReport>;

    /// Circuit states of the lookup path and the downstream.
    fn health(&self) -> ServiceHealth;
}
