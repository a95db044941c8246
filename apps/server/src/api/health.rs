use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::get, Json, Router};
use xref_core::xref::ServiceHealth;

/// Liveness plus the state of every circuit breaker.
///
/// Always 200: an open circuit means the service is degraded, not down.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<ServiceHealth> {
    Json(state.xref_service.health())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}
