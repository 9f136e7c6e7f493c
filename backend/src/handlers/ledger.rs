//! Broker ledger HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ledger::{CostEstimateInput, CostEstimateResult, LedgerService, PostEntryInput};
use crate::AppState;
use crate::models::LedgerEntry;

/// Post an entry against a broker
pub async fn post_ledger_entry(
    State(state): State<AppState>,
    Path(broker_code): Path<String>,
    Json(input): Json<PostEntryInput>,
) -> AppResult<(StatusCode, Json<LedgerEntry>)> {
    let service = LedgerService::new(state.db.clone());
    let entry = service.post_entry(&broker_code, input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// List all entries posted against a broker
pub async fn list_ledger_entries(
    State(state): State<AppState>,
    Path(broker_code): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let service = LedgerService::new(state.db.clone());
    let entries = service.list_entries(&broker_code).await?;
    Ok(Json(serde_json::json!({ "entries": entries })))
}

/// Run a cost-estimation pass over a deal's lots and post the aggregate
/// debit against the broker
pub async fn post_cost_estimate(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
    Json(input): Json<CostEstimateInput>,
) -> AppResult<(StatusCode, Json<CostEstimateResult>)> {
    let service = LedgerService::new(state.db.clone());
    let result = service.post_cost_estimate(sauda_public_id, input).await?;
    Ok((StatusCode::CREATED, Json(result)))
}
