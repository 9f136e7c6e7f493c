//! Lot management HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::lot::{LotService, UpdateLotInput};
use crate::AppState;
use crate::models::Lot;
use shared::types::BatchResponse;

/// List all lots under a sauda
pub async fn list_lots(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let service = LotService::new(state.db.clone());
    let lots = service.get_lots(sauda_public_id).await?;
    Ok(Json(serde_json::json!({ "lots": lots })))
}

/// Get a specific lot
pub async fn get_lot(
    State(state): State<AppState>,
    Path((sauda_public_id, lot_public_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Lot>> {
    let service = LotService::new(state.db.clone());
    let lot = service.get_lot(sauda_public_id, lot_public_id).await?;
    Ok(Json(lot))
}

/// Update a lot. A changed total bora count resets the counters and
/// invalidates the lot's shipments.
pub async fn update_lot(
    State(state): State<AppState>,
    Path((sauda_public_id, lot_public_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateLotInput>,
) -> AppResult<Json<Lot>> {
    let service = LotService::new(state.db.clone());
    let lot = service
        .update_lot(sauda_public_id, lot_public_id, input)
        .await?;
    Ok(Json(lot))
}

#[derive(Debug, Deserialize)]
pub struct BatchUpdateLotsInput {
    pub lot_public_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub patch: UpdateLotInput,
}

/// Apply one patch to several lots, reporting per-item outcomes
pub async fn update_lots_batch(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
    Json(input): Json<BatchUpdateLotsInput>,
) -> AppResult<Json<BatchResponse>> {
    let service = LotService::new(state.db.clone());
    let response = service
        .update_lots_batch(sauda_public_id, input.lot_public_ids, input.patch)
        .await?;
    Ok(Json(response))
}
