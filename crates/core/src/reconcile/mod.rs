//! Reconciliation of the local index against the downstream snapshot.

mod reconcile_model;
mod reconcile_service;


pub use reconcile_model::{ReconcileAction, ReconcileFailure, ReconcileReport};
pub use reconcile_service::ReconciliationService;
