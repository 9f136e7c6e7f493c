//! Analytics HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::analytics::AnalyticsService;
use crate::AppState;
use crate::models::DealAnalytics;

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// Get a deal's progress rollup
pub async fn get_deal_analytics(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
) -> AppResult<Json<DealAnalytics>> {
    let service = AnalyticsService::new(state.db.clone());
    let analytics = service.deal_analytics(sauda_public_id).await?;
    Ok(Json(analytics))
}

/// Get per-lot progress rows for a deal, optionally as a CSV download
pub async fn get_lot_progress(
    State(state): State<AppState>,
    Path(sauda_public_id): Path<Uuid>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<impl IntoResponse> {
    let service = AnalyticsService::new(state.db.clone());
    let rows = service.lot_progress(sauda_public_id).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = AnalyticsService::export_to_csv(&rows)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"lot_progress.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(rows).into_response())
    }
}
