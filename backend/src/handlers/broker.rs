//! Broker management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::broker::{BrokerService, CreateBrokerInput};
use crate::AppState;
use crate::models::Broker;

/// List all brokers
pub async fn list_brokers(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let service = BrokerService::new(state.db.clone());
    let brokers = service.list_brokers().await?;
    Ok(Json(serde_json::json!({ "brokers": brokers })))
}

/// Get a broker by its code
pub async fn get_broker(
    State(state): State<AppState>,
    Path(broker_code): Path<String>,
) -> AppResult<Json<Broker>> {
    let service = BrokerService::new(state.db.clone());
    let broker = service.get_broker(&broker_code).await?;
    Ok(Json(broker))
}

/// Register a new broker
pub async fn create_broker(
    State(state): State<AppState>,
    Json(input): Json<CreateBrokerInput>,
) -> AppResult<(StatusCode, Json<Broker>)> {
    let service = BrokerService::new(state.db.clone());
    let broker = service.create_broker(input).await?;
    Ok((StatusCode::CREATED, Json(broker)))
}
