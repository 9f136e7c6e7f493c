//! Shipment journal HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::shipment::{
    CreateShipmentInput, ShipmentService, ShipmentWithLot, UpdateShipmentInput,
};
use crate::AppState;
use crate::models::Shipment;
use shared::types::BatchResponse;

/// Record a dispatch against a lot
pub async fn create_shipment(
    State(state): State<AppState>,
    Path((sauda_public_id, lot_public_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<CreateShipmentInput>,
) -> AppResult<(StatusCode, Json<Shipment>)> {
    let service = ShipmentService::new(state.db.clone());
    let shipment = service
        .create_shipment(sauda_public_id, lot_public_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

#[derive(Debug, Deserialize)]
pub struct BatchCreateShipmentsInput {
    pub lot_public_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub shipment: CreateShipmentInput,
}

/// Record the same dispatch against several lots
pub async fn create_shipments_batch(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
    Json(input): Json<BatchCreateShipmentsInput>,
) -> AppResult<Json<BatchResponse>> {
    let service = ShipmentService::new(state.db.clone());
    let response = service
        .create_shipments_batch(sauda_public_id, input.lot_public_ids, input.shipment)
        .await?;
    Ok(Json(response))
}

/// Get a shipment with its owning lot's projection
pub async fn get_shipment(
    State(state): State<AppState>,
    Path(shipment_public_id): Path<Uuid>,
) -> AppResult<Json<ShipmentWithLot>> {
    let service = ShipmentService::new(state.db.clone());
    let shipment = service.get_shipment(shipment_public_id).await?;
    Ok(Json(shipment))
}

/// List all shipments for a lot
pub async fn list_shipments_for_lot(
    State(state): State<AppState>,
    Path((sauda_public_id, lot_public_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    let service = ShipmentService::new(state.db.clone());
    let shipments = service
        .get_shipments_for_lot(sauda_public_id, lot_public_id)
        .await?;
    Ok(Json(serde_json::json!({ "shipments": shipments })))
}

/// List all shipments under a sauda
pub async fn list_shipments_for_deal(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let service = ShipmentService::new(state.db.clone());
    let shipments = service.get_shipments_for_sauda(sauda_public_id).await?;
    Ok(Json(serde_json::json!({ "shipments": shipments })))
}

/// Update a shipment with merge semantics
pub async fn update_shipment(
    State(state): State<AppState>,
    Path(shipment_public_id): Path<Uuid>,
    Json(input): Json<UpdateShipmentInput>,
) -> AppResult<Json<Shipment>> {
    let service = ShipmentService::new(state.db.clone());
    let shipment = service.update_shipment(shipment_public_id, input).await?;
    Ok(Json(shipment))
}

#[derive(Debug, Deserialize)]
pub struct BatchUpdateShipmentsInput {
    pub shipment_public_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub patch: UpdateShipmentInput,
}

/// Apply one patch to several shipments, reporting per-item outcomes
pub async fn update_shipments_batch(
    State(state): State<AppState>,
    Json(input): Json<BatchUpdateShipmentsInput>,
) -> AppResult<Json<BatchResponse>> {
    let service = ShipmentService::new(state.db.clone());
    let response = service
        .update_shipments_batch(input.shipment_public_ids, input.patch)
        .await?;
    Ok(Json(response))
}

/// Delete a shipment, re-crediting the owning lot's capacity
pub async fn delete_shipment(
    State(state): State<AppState>,
    Path((sauda_public_id, lot_public_id, shipment_public_id)): Path<(Uuid, Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let service = ShipmentService::new(state.db.clone());
    service
        .delete_shipment(sauda_public_id, lot_public_id, shipment_public_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
