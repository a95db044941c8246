use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;
use xref_core::lookup::{LookupRequest, LookupResponse};
use xref_core::reconcile::ReconcileReport;
use xref_core::SymbolRecord;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupQuery {
    id_type: String,
    id_value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSymbolRequest {
    old_symbol: SymbolRecord,
    new_symbol: SymbolRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageResponse {
    message: String,
}

/// Counters of a refresh, or the reason it was aborted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub errors: usize,
    pub status: String,
}

impl From<&ReconcileReport> for RefreshResponse {
    fn from(report: &ReconcileReport) -> Self {
        Self {
            added: report.added,
            updated: report.updated,
            deleted: report.deleted,
            errors: report.errors,
            status: report.summary(),
        }
    }
}

impl RefreshResponse {
    fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            added: 0,
            updated: 0,
            deleted: 0,
            errors: 0,
            status: format!("Failed: {}", reason),
        }
    }
}

async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<LookupResponse>> {
    let outcome = state
        .xref_service
        .lookup_symbol(&query.id_type, &query.id_value)
        .await?;
    Ok(Json(outcome.to_response()))
}

async fn batch_lookup(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<LookupRequest>>,
) -> Json<Vec<LookupResponse>> {
    Json(state.xref_service.batch_lookup(&requests).await)
}

async fn add_symbol(
    State(state): State<Arc<AppState>>,
    Json(record): Json<SymbolRecord>,
) -> ApiResult<Json<MessageResponse>> {
    let symbol_id = record.symbol_id.clone();
    state.xref_service.add_symbol(record).await?;
    tracing::info!("Symbol {} added via API", symbol_id);
    Ok(Json(MessageResponse {
        message: "Symbol added successfully".to_string(),
    }))
}

async fn update_symbol(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateSymbolRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .xref_service
        .update_symbol(body.old_symbol, body.new_symbol)
        .await?;
    Ok(Json(MessageResponse {
        message: "Symbol updated successfully".to_string(),
    }))
}

async fn delete_symbol(
    State(state): State<Arc<AppState>>,
    Path(symbol_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.xref_service.delete_symbol(&symbol_id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(MessageResponse {
        message: "Symbol deleted successfully".to_string(),
    }))
}

async fn refresh(State(state): State<Arc<AppState>>) -> (StatusCode, Json<RefreshResponse>) {
    match state.xref_service.refresh_cache().await {
        Ok(report) => (StatusCode::OK, Json(RefreshResponse::from(&report))),
        Err(e) => {
            tracing::error!("Cache refresh failed: {}", e);
            let status = if e.is_unavailable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(RefreshResponse::failed(e)))
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lookup", get(lookup))
        .route("/lookup/batch", post(batch_lookup))
        .route("/symbol", post(add_symbol).put(update_symbol))
        .route("/symbol/{symbol_id}", delete(delete_symbol))
        .route("/refresh", post(refresh))
}
