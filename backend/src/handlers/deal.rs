//! Sauda (deal) management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::deal::{CreateDealInput, DealService, UpdateStatusInput};
use crate::AppState;
use crate::models::Sauda;

/// List all saudas
pub async fn list_deals(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let service = DealService::new(state.db.clone());
    let deals = service.list_deals().await?;
    Ok(Json(serde_json::json!({ "deals": deals })))
}

/// Get a specific sauda
pub async fn get_deal(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
) -> AppResult<Json<Sauda>> {
    let service = DealService::new(state.db.clone());
    let deal = service.get_deal(sauda_public_id).await?;
    Ok(Json(deal))
}

/// Create a new sauda, spawning its lots
pub async fn create_deal(
    State(state): State<AppState>,
    Json(input): Json<CreateDealInput>,
) -> AppResult<(StatusCode, Json<Sauda>)> {
    let service = DealService::new(state.db.clone());
    let deal = service.create_deal(input).await?;
    Ok((StatusCode::CREATED, Json(deal)))
}

/// Update a sauda's status (stored verbatim)
pub async fn update_deal_status(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<Json<Sauda>> {
    let service = DealService::new(state.db.clone());
    let deal = service.update_status(sauda_public_id, input).await?;
    Ok(Json(deal))
}

/// Delete a sauda, cascading to its lots and shipments
pub async fn delete_deal(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = DealService::new(state.db.clone());
    service.delete_deal(sauda_public_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
