use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{watch, Mutex};

use super::{ReconcileAction, ReconcileReport};
use crate::downstream::SnapshotProvider;
use crate::errors::Result;
use crate::index::{SymbolIndex, UpsertOutcome};
use crate::symbols::SymbolRecord;

/// Brings the local index into agreement with the downstream snapshot.
///
/// A pass fetches the full snapshot, then adds missing symbols, re-indexes
/// symbols whose tracked identifiers changed, and deletes local symbols the
/// snapshot no longer carries. A failure on one symbol is recorded and the
/// pass moves on. If the snapshot cannot be obtained nothing is mutated.
///
/// Passes are serialized: a pass requested while another runs waits for it.
pub struct ReconciliationService {
    index: Arc<SymbolIndex>,
    downstream: Arc<dyn SnapshotProvider>,
    running: Mutex<()>,
}

impl ReconciliationService {
    pub fn new(index: Arc<SymbolIndex>, downstream: Arc<dyn SnapshotProvider>) -> Self {
        Self {
            index,
            downstream,
            running: Mutex::new(()),
        }
    }

    /// Run a full pass.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let (_tx, rx) = watch::channel(false);
        self.reconcile_until(rx).await
    }

    /// Run a full pass, stopping between symbols once `shutdown` turns true.
    ///
    /// A mutation already in progress always completes. Symbols not reached
    /// are picked up by the next pass.
    pub async fn reconcile_until(&self, shutdown: watch::Receiver<bool>) -> Result<ReconcileReport> {
        let _running = self.running.lock().await;
        let mut report = ReconcileReport::start();

        let snapshot = match self.downstream.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Cache refresh aborted, downstream snapshot unavailable: {}", e);
                return Err(e);
            }
        };
        let existing = self.index.list_all_symbol_ids().await?;
        info!(
            "Reconciling {} downstream symbols against {} cached symbols",
            snapshot.len(),
            existing.len()
        );

        let mut latest_ids: HashSet<String> = HashSet::with_capacity(snapshot.len());
        for record in snapshot {
            if *shutdown.borrow() {
                report.interrupted = true;
                break;
            }
            if let Err(e) = record.validate() {
                warn!("Skipping downstream record: {}", e);
                report.record_failure(&record.symbol_id, ReconcileAction::Add, e.to_string());
                continue;
            }
            if !latest_ids.insert(record.symbol_id.clone()) {
                warn!("Duplicate symbol {} in downstream snapshot, ignoring", record.symbol_id);
                report.record_failure(
                    &record.symbol_id,
                    ReconcileAction::Update,
                    "duplicate symbol in snapshot",
                );
                continue;
            }

            // A symbol removed since the listing is added back.
            let action = if existing.contains(&record.symbol_id) {
                ReconcileAction::Update
            } else {
                ReconcileAction::Add
            };
            self.apply(&record, action, &mut report).await;
        }

        if !report.interrupted {
            for symbol_id in existing.difference(&latest_ids) {
                if *shutdown.borrow() {
                    report.interrupted = true;
                    break;
                }
                match self.index.remove(symbol_id).await {
                    Ok(true) => report.deleted += 1,
                    Ok(false) => debug!("Symbol {} already gone", symbol_id),
                    Err(e) => {
                        error!("Failed to delete symbol {}: {}", symbol_id, e);
                        report.record_failure(symbol_id, ReconcileAction::Delete, e.to_string());
                    }
                }
            }
        }

        let report = report.finish();
        if report.interrupted {
            warn!("Cache refresh interrupted by shutdown: {}", report.summary());
        } else {
            info!("Cache refresh completed: {}", report.summary());
        }
        Ok(report)
    }

    async fn apply(
        &self,
        record: &SymbolRecord,
        action: ReconcileAction,
        report: &mut ReconcileReport,
    ) {
        match self.index.upsert(record).await {
            Ok(UpsertOutcome::Added) => report.added += 1,
            Ok(UpsertOutcome::Updated) => report.updated += 1,
            Ok(UpsertOutcome::Unchanged) => {}
            Err(e) => {
                error!("Failed to {} symbol {}: {}", action, record.symbol_id, e);
                report.record_failure(&record.symbol_id, action, e.to_string());
            }
        }
    }
}
