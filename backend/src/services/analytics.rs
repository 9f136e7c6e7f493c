//! Analytics service: read-only per-deal progress rollups

use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::deal::DealService;
use crate::services::lot::LotService;
use crate::services::shipment::ShipmentService;
use shared::models::{fold_deal_analytics, DealAnalytics, Lot, LotProgressRow, Shipment};

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

impl AnalyticsService {
    /// Create a new AnalyticsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Roll up a deal's progress: bora shipped/total, flap-sticker and
    /// gate-pass completion across lots, and FRK completion when any lot
    /// has an FRK shipment. A deal with no lots reports all-zero progress.
    pub async fn deal_analytics(&self, sauda_public_id: Uuid) -> AppResult<DealAnalytics> {
        let deal = DealService::new(self.db.clone())
            .get_deal(sauda_public_id)
            .await?;

        let lots_with_shipments = self.lots_with_shipments(sauda_public_id).await?;

        Ok(fold_deal_analytics(
            sauda_public_id,
            deal.total_lots,
            &lots_with_shipments,
        ))
    }

    /// Per-lot progress rows for a deal, for tabular display or CSV export
    pub async fn lot_progress(&self, sauda_public_id: Uuid) -> AppResult<Vec<LotProgressRow>> {
        // NotFound when the deal itself is missing; an empty lot list is fine
        DealService::new(self.db.clone())
            .get_deal(sauda_public_id)
            .await?;

        let lots_with_shipments = self.lots_with_shipments(sauda_public_id).await?;

        Ok(lots_with_shipments
            .iter()
            .map(|(lot, shipments)| LotProgressRow::derive(lot, shipments))
            .collect())
    }

    async fn lots_with_shipments(
        &self,
        sauda_public_id: Uuid,
    ) -> AppResult<Vec<(Lot, Vec<Shipment>)>> {
        let lots = LotService::new(self.db.clone())
            .get_lots(sauda_public_id)
            .await?;
        let shipments = ShipmentService::new(self.db.clone())
            .get_shipments_for_sauda(sauda_public_id)
            .await?;

        let mut by_lot: HashMap<Uuid, Vec<Shipment>> = HashMap::new();
        for joined in shipments {
            by_lot
                .entry(joined.shipment.lot_public_id)
                .or_default()
                .push(joined.shipment);
        }

        Ok(lots
            .into_iter()
            .map(|lot| {
                let shipments = by_lot.remove(&lot.public_id).unwrap_or_default();
                (lot, shipments)
            })
            .collect())
    }

    /// Serialize report rows as CSV for download
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
