//! Shipment journal service
//!
//! Creates, reads, updates, and deletes shipment records while keeping the
//! owning lot's bora counters consistent through the lot ledger. Shipment
//! insert, lot counter update, and deal status update are independent
//! writes: a failed counter update compensates by removing the
//! just-inserted shipment rather than leaving an orphan.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::deal::DealService;
use crate::services::lot::LotService;
use shared::models::{FrkBheja, Shipment};
use shared::types::{BatchItemResult, BatchResponse};
use shared::validation::validate_sent_bora_count;

const SHIPMENT_COLUMNS: &str = "public_id, lot_public_id, sauda_public_id, sent_bora_count, \
     shipping_date, shipped_via, flap_sticker_date, flap_sticker_via, gate_pass_date, \
     gate_pass_via, frk, frk_bheja, created_at, updated_at";

/// Shipment service
#[derive(Clone)]
pub struct ShipmentService {
    db: PgPool,
}

/// Input for recording a shipment
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShipmentInput {
    pub sent_bora_count: i32,
    pub shipping_date: Option<DateTime<Utc>>,
    pub shipped_via: Option<String>,
    pub flap_sticker_date: Option<DateTime<Utc>>,
    pub flap_sticker_via: Option<String>,
    pub gate_pass_date: Option<DateTime<Utc>>,
    pub gate_pass_via: Option<String>,
    #[serde(default)]
    pub frk: bool,
    pub frk_bheja: Option<FrkBheja>,
}

/// Input for updating a shipment. Merge semantics: only fields present are
/// applied. The sent bora count is deliberately not patchable; correcting a
/// count is a delete followed by a new shipment so the lot's counters stay
/// conserved.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateShipmentInput {
    pub shipping_date: Option<DateTime<Utc>>,
    pub shipped_via: Option<String>,
    pub flap_sticker_date: Option<DateTime<Utc>>,
    pub flap_sticker_via: Option<String>,
    pub gate_pass_date: Option<DateTime<Utc>>,
    pub gate_pass_via: Option<String>,
    pub frk: Option<bool>,
    pub frk_bheja: Option<FrkBheja>,
}

/// Read-only projection of the owning lot, joined onto shipment reads for
/// display convenience
#[derive(Debug, Clone, Serialize)]
pub struct LotSummary {
    pub lot_public_id: Uuid,
    pub rice_lot_no: Option<String>,
    pub total_bora_count: i32,
    pub shipped_bora_count: i32,
    pub remaining_bora_count: i32,
}

/// A shipment with its owning lot's projection
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentWithLot {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub lot: LotSummary,
}

#[derive(Debug, FromRow)]
struct ShipmentRow {
    public_id: Uuid,
    lot_public_id: Uuid,
    sauda_public_id: Uuid,
    sent_bora_count: i32,
    shipping_date: Option<DateTime<Utc>>,
    shipped_via: Option<String>,
    flap_sticker_date: Option<DateTime<Utc>>,
    flap_sticker_via: Option<String>,
    gate_pass_date: Option<DateTime<Utc>>,
    gate_pass_via: Option<String>,
    frk: bool,
    frk_bheja: Option<Json<FrkBheja>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShipmentRow> for Shipment {
    fn from(row: ShipmentRow) -> Self {
        Shipment {
            public_id: row.public_id,
            lot_public_id: row.lot_public_id,
            sauda_public_id: row.sauda_public_id,
            sent_bora_count: row.sent_bora_count,
            shipping_date: row.shipping_date,
            shipped_via: row.shipped_via,
            flap_sticker_date: row.flap_sticker_date,
            flap_sticker_via: row.flap_sticker_via,
            gate_pass_date: row.gate_pass_date,
            gate_pass_via: row.gate_pass_via,
            frk: row.frk,
            frk_bheja: row.frk_bheja.map(|j| j.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ShipmentWithLotRow {
    public_id: Uuid,
    lot_public_id: Uuid,
    sauda_public_id: Uuid,
    sent_bora_count: i32,
    shipping_date: Option<DateTime<Utc>>,
    shipped_via: Option<String>,
    flap_sticker_date: Option<DateTime<Utc>>,
    flap_sticker_via: Option<String>,
    gate_pass_date: Option<DateTime<Utc>>,
    gate_pass_via: Option<String>,
    frk: bool,
    frk_bheja: Option<Json<FrkBheja>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    lot_rice_lot_no: Option<String>,
    lot_total_bora_count: i32,
    lot_shipped_bora_count: i32,
    lot_remaining_bora_count: i32,
}

impl From<ShipmentWithLotRow> for ShipmentWithLot {
    fn from(row: ShipmentWithLotRow) -> Self {
        let lot = LotSummary {
            lot_public_id: row.lot_public_id,
            rice_lot_no: row.lot_rice_lot_no.clone(),
            total_bora_count: row.lot_total_bora_count,
            shipped_bora_count: row.lot_shipped_bora_count,
            remaining_bora_count: row.lot_remaining_bora_count,
        };
        let shipment = Shipment {
            public_id: row.public_id,
            lot_public_id: row.lot_public_id,
            sauda_public_id: row.sauda_public_id,
            sent_bora_count: row.sent_bora_count,
            shipping_date: row.shipping_date,
            shipped_via: row.shipped_via,
            flap_sticker_date: row.flap_sticker_date,
            flap_sticker_via: row.flap_sticker_via,
            gate_pass_date: row.gate_pass_date,
            gate_pass_via: row.gate_pass_via,
            frk: row.frk,
            frk_bheja: row.frk_bheja.map(|j| j.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        ShipmentWithLot { shipment, lot }
    }
}

const SHIPMENT_WITH_LOT_QUERY: &str = r#"
    SELECT s.public_id, s.lot_public_id, s.sauda_public_id, s.sent_bora_count,
           s.shipping_date, s.shipped_via, s.flap_sticker_date, s.flap_sticker_via,
           s.gate_pass_date, s.gate_pass_via, s.frk, s.frk_bheja, s.created_at, s.updated_at,
           l.rice_lot_no AS lot_rice_lot_no,
           l.total_bora_count AS lot_total_bora_count,
           l.shipped_bora_count AS lot_shipped_bora_count,
           l.remaining_bora_count AS lot_remaining_bora_count
    FROM shipments s
    JOIN lots l ON l.public_id = s.lot_public_id
"#;

impl ShipmentService {
    /// Create a new ShipmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a dispatch against a lot. Consumes the lot's remaining
    /// capacity and pushes the owning deal to IN_TRANSPORT.
    pub async fn create_shipment(
        &self,
        sauda_public_id: Uuid,
        lot_public_id: Uuid,
        input: CreateShipmentInput,
    ) -> AppResult<Shipment> {
        let shipment = self
            .create_for_lot(sauda_public_id, lot_public_id, input)
            .await?;

        DealService::new(self.db.clone())
            .mark_in_transport(sauda_public_id)
            .await?;

        Ok(shipment)
    }

    /// Record the same dispatch against several lots. Each lot's update is
    /// independent: one lot overdrawing its capacity does not roll back the
    /// others. The deal moves to IN_TRANSPORT if any shipment was recorded.
    pub async fn create_shipments_batch(
        &self,
        sauda_public_id: Uuid,
        lot_public_ids: Vec<Uuid>,
        input: CreateShipmentInput,
    ) -> AppResult<BatchResponse> {
        let creations = lot_public_ids.into_iter().map(|lot_public_id| {
            let service = self.clone();
            let data = input.clone();
            async move {
                match service
                    .create_for_lot(sauda_public_id, lot_public_id, data)
                    .await
                {
                    Ok(_) => BatchItemResult::ok(lot_public_id),
                    Err(e) => BatchItemResult::failed(lot_public_id, e.to_string()),
                }
            }
        });

        let response = BatchResponse::from_results(join_all(creations).await);

        if response.succeeded > 0 {
            DealService::new(self.db.clone())
                .mark_in_transport(sauda_public_id)
                .await?;
        }

        Ok(response)
    }

    async fn create_for_lot(
        &self,
        sauda_public_id: Uuid,
        lot_public_id: Uuid,
        input: CreateShipmentInput,
    ) -> AppResult<Shipment> {
        validate_sent_bora_count(input.sent_bora_count).map_err(|msg| AppError::Validation {
            field: "sent_bora_count".to_string(),
            message: msg.to_string(),
        })?;

        // Verify the lot exists under this sauda before writing anything
        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT sauda_public_id FROM lots WHERE public_id = $1",
        )
        .bind(lot_public_id)
        .fetch_optional(&self.db)
        .await?;

        if owner != Some(sauda_public_id) {
            return Err(AppError::NotFound("Lot".to_string()));
        }

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            INSERT INTO shipments (
                lot_public_id, sauda_public_id, sent_bora_count, shipping_date, shipped_via,
                flap_sticker_date, flap_sticker_via, gate_pass_date, gate_pass_via, frk, frk_bheja
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(lot_public_id)
        .bind(sauda_public_id)
        .bind(input.sent_bora_count)
        .bind(input.shipping_date)
        .bind(&input.shipped_via)
        .bind(input.flap_sticker_date)
        .bind(&input.flap_sticker_via)
        .bind(input.gate_pass_date)
        .bind(&input.gate_pass_via)
        .bind(input.frk)
        .bind(input.frk_bheja.map(Json))
        .fetch_one(&self.db)
        .await?;

        let shipment: Shipment = row.into();

        // Apply the capacity decrement; on failure remove the shipment we
        // just inserted so the journal and the counters stay consistent.
        let lot_service = LotService::new(self.db.clone());
        if let Err(apply_err) = lot_service
            .apply_shipment(lot_public_id, shipment.public_id, shipment.sent_bora_count)
            .await
        {
            if let Err(cleanup_err) = sqlx::query("DELETE FROM shipments WHERE public_id = $1")
                .bind(shipment.public_id)
                .execute(&self.db)
                .await
            {
                tracing::error!(
                    shipment = %shipment.public_id,
                    error = %cleanup_err,
                    "failed to remove shipment after lot update failure"
                );
            }
            return Err(apply_err);
        }

        Ok(shipment)
    }

    /// Get a shipment with its owning lot's projection
    pub async fn get_shipment(&self, shipment_public_id: Uuid) -> AppResult<ShipmentWithLot> {
        let query = format!("{SHIPMENT_WITH_LOT_QUERY} WHERE s.public_id = $1");
        let row = sqlx::query_as::<_, ShipmentWithLotRow>(&query)
            .bind(shipment_public_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?;

        Ok(row.into())
    }

    /// Get all shipments for a lot
    pub async fn get_shipments_for_lot(
        &self,
        sauda_public_id: Uuid,
        lot_public_id: Uuid,
    ) -> AppResult<Vec<ShipmentWithLot>> {
        let query = format!(
            "{SHIPMENT_WITH_LOT_QUERY} WHERE s.lot_public_id = $1 AND s.sauda_public_id = $2 \
             ORDER BY s.created_at ASC"
        );
        let rows = sqlx::query_as::<_, ShipmentWithLotRow>(&query)
            .bind(lot_public_id)
            .bind(sauda_public_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(ShipmentWithLot::from).collect())
    }

    /// Get all shipments under a sauda
    pub async fn get_shipments_for_sauda(
        &self,
        sauda_public_id: Uuid,
    ) -> AppResult<Vec<ShipmentWithLot>> {
        let query =
            format!("{SHIPMENT_WITH_LOT_QUERY} WHERE s.sauda_public_id = $1 ORDER BY s.created_at ASC");
        let rows = sqlx::query_as::<_, ShipmentWithLotRow>(&query)
            .bind(sauda_public_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(ShipmentWithLot::from).collect())
    }

    /// Update a shipment with merge semantics
    pub async fn update_shipment(
        &self,
        shipment_public_id: Uuid,
        input: UpdateShipmentInput,
    ) -> AppResult<Shipment> {
        let existing_row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE public_id = $1"
        ))
        .bind(shipment_public_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?;
        let existing: Shipment = existing_row.into();

        let shipping_date = input.shipping_date.or(existing.shipping_date);
        let shipped_via = input.shipped_via.or(existing.shipped_via);
        let flap_sticker_date = input.flap_sticker_date.or(existing.flap_sticker_date);
        let flap_sticker_via = input.flap_sticker_via.or(existing.flap_sticker_via);
        let gate_pass_date = input.gate_pass_date.or(existing.gate_pass_date);
        let gate_pass_via = input.gate_pass_via.or(existing.gate_pass_via);
        let frk = input.frk.unwrap_or(existing.frk);
        let frk_bheja = input.frk_bheja.or(existing.frk_bheja);

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            UPDATE shipments
            SET shipping_date = $1, shipped_via = $2, flap_sticker_date = $3,
                flap_sticker_via = $4, gate_pass_date = $5, gate_pass_via = $6,
                frk = $7, frk_bheja = $8, updated_at = NOW()
            WHERE public_id = $9
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(shipping_date)
        .bind(&shipped_via)
        .bind(flap_sticker_date)
        .bind(&flap_sticker_via)
        .bind(gate_pass_date)
        .bind(&gate_pass_via)
        .bind(frk)
        .bind(frk_bheja.map(Json))
        .bind(shipment_public_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Apply one patch to several shipments, reporting per-item outcomes
    pub async fn update_shipments_batch(
        &self,
        shipment_public_ids: Vec<Uuid>,
        input: UpdateShipmentInput,
    ) -> AppResult<BatchResponse> {
        let updates = shipment_public_ids.into_iter().map(|shipment_public_id| {
            let service = self.clone();
            let patch = input.clone();
            async move {
                match service.update_shipment(shipment_public_id, patch).await {
                    Ok(_) => BatchItemResult::ok(shipment_public_id),
                    Err(e) => BatchItemResult::failed(shipment_public_id, e.to_string()),
                }
            }
        });

        let results = join_all(updates).await;
        Ok(BatchResponse::from_results(results))
    }

    /// Delete a shipment and re-credit its bora count to the owning lot.
    /// A shipment that no longer exists is NotFound, never a zero-credit.
    pub async fn delete_shipment(
        &self,
        sauda_public_id: Uuid,
        lot_public_id: Uuid,
        shipment_public_id: Uuid,
    ) -> AppResult<()> {
        let sent_bora_count = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT sent_bora_count FROM shipments
            WHERE public_id = $1 AND lot_public_id = $2 AND sauda_public_id = $3
            "#,
        )
        .bind(shipment_public_id)
        .bind(lot_public_id)
        .bind(sauda_public_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?;

        sqlx::query("DELETE FROM shipments WHERE public_id = $1")
            .bind(shipment_public_id)
            .execute(&self.db)
            .await?;

        LotService::new(self.db.clone())
            .reverse_shipment(lot_public_id, shipment_public_id, sent_bora_count)
            .await?;

        Ok(())
    }
}
