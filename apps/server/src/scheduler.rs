//! Background scheduler for periodic cache refresh.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::main_lib::AppState;

/// Starts the background refresh scheduler.
///
/// The first pass runs after `initial_delay`, then every `every`. Once
/// `shutdown` turns true the task stops; a pass in progress finishes the
/// symbol it is working on and returns early.
pub fn start_refresh_scheduler(
    state: Arc<AppState>,
    every: Duration,
    initial_delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Cache refresh scheduler started ({}s interval, first run in {}s)",
            every.as_secs(),
            initial_delay.as_secs()
        );

        tokio::select! {
            _ = tokio::time::sleep(initial_delay) => {}
            _ = shutdown.changed() => {
                info!("Cache refresh scheduler stopped before first run");
                return;
            }
        }

        // First tick is immediate, subsequent ticks are `every` apart.
        let mut refresh_interval = interval(every);
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = refresh_interval.tick() => {}
                _ = shutdown.changed() => break,
            }
            if *shutdown.borrow() {
                break;
            }
            run_scheduled_refresh(&state, shutdown.clone()).await;
        }
        info!("Cache refresh scheduler stopped");
    })
}

/// Runs a single scheduled refresh.
async fn run_scheduled_refresh(state: &Arc<AppState>, shutdown: watch::Receiver<bool>) {
    info!("Running scheduled cache refresh...");

    match state.reconciler.reconcile_until(shutdown).await {
        Ok(report) => {
            info!(
                "Scheduled cache refresh finished: added={}, updated={}, deleted={}, errors={}",
                report.added, report.updated, report.deleted, report.errors
            );
        }
        Err(e) => {
            // Nothing was mutated; the next tick retries.
            warn!("Scheduled cache refresh failed: {}", e);
        }
    }
}
