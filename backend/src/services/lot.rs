//! Lot ledger service: bora-count bookkeeping and lot mutation
//!
//! Counter updates that pair with shipment activity are issued as single
//! conditional UPDATE statements so the capacity check, the decrement, and
//! the shipment-list change are one atomic row write.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{FrkBheja, Lot};
use shared::types::{BatchItemResult, BatchResponse};
use shared::validation::{validate_expense, validate_total_bora_count};

const LOT_COLUMNS: &str = "public_id, sauda_public_id, rice_lot_no, total_bora_count, \
     shipped_bora_count, remaining_bora_count, is_fully_shipped, shipment_ids, qtl, \
     rice_bags_quantity, net_rice_bought, moisture_cut, rice_deposit_centre, rice_pass_date, \
     frk, frk_bheja, qi_expense, lot_dalali_expense, other_expenses, brokerage, nett_amount, \
     created_at, updated_at";

/// Lot service for reads, merge-semantics updates, and the counter
/// operations invoked by the shipment journal
#[derive(Clone)]
pub struct LotService {
    db: PgPool,
}

/// Input for updating a lot. Only fields present are applied; setting
/// `total_bora_count` resets the counters and invalidates every shipment
/// previously recorded against the lot.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLotInput {
    pub rice_lot_no: Option<String>,
    pub total_bora_count: Option<i32>,
    pub qtl: Option<Decimal>,
    pub rice_bags_quantity: Option<i32>,
    pub net_rice_bought: Option<Decimal>,
    pub moisture_cut: Option<Decimal>,
    pub rice_deposit_centre: Option<String>,
    pub rice_pass_date: Option<DateTime<Utc>>,
    pub frk: Option<bool>,
    pub frk_bheja: Option<FrkBheja>,
    pub qi_expense: Option<Decimal>,
    pub lot_dalali_expense: Option<Decimal>,
    pub other_expenses: Option<Decimal>,
    pub brokerage: Option<Decimal>,
}

#[derive(Debug, FromRow)]
pub(crate) struct LotRow {
    pub public_id: Uuid,
    pub sauda_public_id: Uuid,
    pub rice_lot_no: Option<String>,
    pub total_bora_count: i32,
    pub shipped_bora_count: i32,
    pub remaining_bora_count: i32,
    pub is_fully_shipped: bool,
    pub shipment_ids: Vec<Uuid>,
    pub qtl: Decimal,
    pub rice_bags_quantity: i32,
    pub net_rice_bought: Decimal,
    pub moisture_cut: Decimal,
    pub rice_deposit_centre: Option<String>,
    pub rice_pass_date: Option<DateTime<Utc>>,
    pub frk: bool,
    pub frk_bheja: Option<Json<FrkBheja>>,
    pub qi_expense: Decimal,
    pub lot_dalali_expense: Decimal,
    pub other_expenses: Decimal,
    pub brokerage: Decimal,
    pub nett_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LotRow> for Lot {
    fn from(row: LotRow) -> Self {
        Lot {
            public_id: row.public_id,
            sauda_public_id: row.sauda_public_id,
            rice_lot_no: row.rice_lot_no,
            total_bora_count: row.total_bora_count,
            shipped_bora_count: row.shipped_bora_count,
            remaining_bora_count: row.remaining_bora_count,
            is_fully_shipped: row.is_fully_shipped,
            shipment_ids: row.shipment_ids,
            qtl: row.qtl,
            rice_bags_quantity: row.rice_bags_quantity,
            net_rice_bought: row.net_rice_bought,
            moisture_cut: row.moisture_cut,
            rice_deposit_centre: row.rice_deposit_centre,
            rice_pass_date: row.rice_pass_date,
            frk: row.frk,
            frk_bheja: row.frk_bheja.map(|j| j.0),
            qi_expense: row.qi_expense,
            lot_dalali_expense: row.lot_dalali_expense,
            other_expenses: row.other_expenses,
            brokerage: row.brokerage,
            nett_amount: row.nett_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl LotService {
    /// Create a new LotService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all lots under a sauda
    pub async fn get_lots(&self, sauda_public_id: Uuid) -> AppResult<Vec<Lot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM lots WHERE sauda_public_id = $1 ORDER BY created_at ASC"
        ))
        .bind(sauda_public_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Lot::from).collect())
    }

    /// Get a lot by its public id, scoped to its owning sauda
    pub async fn get_lot(&self, sauda_public_id: Uuid, lot_public_id: Uuid) -> AppResult<Lot> {
        let row = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM lots WHERE public_id = $1 AND sauda_public_id = $2"
        ))
        .bind(lot_public_id)
        .bind(sauda_public_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

        Ok(row.into())
    }

    /// Update a lot with merge semantics. When `total_bora_count` changes,
    /// the counters reset to the new total and all shipments recorded
    /// against the lot are deleted: their consumption was computed against
    /// the stale total.
    pub async fn update_lot(
        &self,
        sauda_public_id: Uuid,
        lot_public_id: Uuid,
        input: UpdateLotInput,
    ) -> AppResult<Lot> {
        validate_update(&input)?;

        let existing = self.get_lot(sauda_public_id, lot_public_id).await?;

        let resets_capacity = input
            .total_bora_count
            .is_some_and(|t| t != existing.total_bora_count);

        let rice_lot_no = input.rice_lot_no.or(existing.rice_lot_no);
        let qtl = input.qtl.unwrap_or(existing.qtl);
        let rice_bags_quantity = input.rice_bags_quantity.unwrap_or(existing.rice_bags_quantity);
        let net_rice_bought = input.net_rice_bought.unwrap_or(existing.net_rice_bought);
        let moisture_cut = input.moisture_cut.unwrap_or(existing.moisture_cut);
        let rice_deposit_centre = input.rice_deposit_centre.or(existing.rice_deposit_centre);
        let rice_pass_date = input.rice_pass_date.or(existing.rice_pass_date);
        let frk = input.frk.unwrap_or(existing.frk);
        let frk_bheja = input.frk_bheja.or(existing.frk_bheja);
        let qi_expense = input.qi_expense.unwrap_or(existing.qi_expense);
        let lot_dalali_expense = input
            .lot_dalali_expense
            .unwrap_or(existing.lot_dalali_expense);
        let other_expenses = input.other_expenses.unwrap_or(existing.other_expenses);
        let brokerage = input.brokerage.unwrap_or(existing.brokerage);

        let mut tx = self.db.begin().await?;

        if resets_capacity {
            let deleted = sqlx::query("DELETE FROM shipments WHERE lot_public_id = $1")
                .bind(lot_public_id)
                .execute(&mut *tx)
                .await?;
            tracing::info!(
                lot = %lot_public_id,
                invalidated = deleted.rows_affected(),
                "total bora count changed, shipments invalidated"
            );
        }

        let new_total = input.total_bora_count.unwrap_or(existing.total_bora_count);
        let (total, shipped, remaining, fully_shipped, shipment_ids) = if resets_capacity {
            (new_total, 0, new_total, false, Vec::new())
        } else {
            (
                existing.total_bora_count,
                existing.shipped_bora_count,
                existing.remaining_bora_count,
                existing.is_fully_shipped,
                existing.shipment_ids,
            )
        };

        let row = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            UPDATE lots
            SET rice_lot_no = $1, total_bora_count = $2, shipped_bora_count = $3,
                remaining_bora_count = $4, is_fully_shipped = $5, shipment_ids = $6,
                qtl = $7, rice_bags_quantity = $8, net_rice_bought = $9, moisture_cut = $10,
                rice_deposit_centre = $11, rice_pass_date = $12, frk = $13, frk_bheja = $14,
                qi_expense = $15, lot_dalali_expense = $16, other_expenses = $17,
                brokerage = $18, updated_at = NOW()
            WHERE public_id = $19
            RETURNING {LOT_COLUMNS}
            "#
        ))
        .bind(&rice_lot_no)
        .bind(total)
        .bind(shipped)
        .bind(remaining)
        .bind(fully_shipped)
        .bind(&shipment_ids)
        .bind(qtl)
        .bind(rice_bags_quantity)
        .bind(net_rice_bought)
        .bind(moisture_cut)
        .bind(&rice_deposit_centre)
        .bind(rice_pass_date)
        .bind(frk)
        .bind(frk_bheja.map(Json))
        .bind(qi_expense)
        .bind(lot_dalali_expense)
        .bind(other_expenses)
        .bind(brokerage)
        .bind(lot_public_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Apply one update to several lots. Each lot is independent: failures
    /// are reported per item and never roll back completed siblings.
    pub async fn update_lots_batch(
        &self,
        sauda_public_id: Uuid,
        lot_public_ids: Vec<Uuid>,
        input: UpdateLotInput,
    ) -> AppResult<BatchResponse> {
        let updates = lot_public_ids.into_iter().map(|lot_public_id| {
            let service = self.clone();
            let patch = input.clone();
            async move {
                match service
                    .update_lot(sauda_public_id, lot_public_id, patch)
                    .await
                {
                    Ok(_) => BatchItemResult::ok(lot_public_id),
                    Err(e) => BatchItemResult::failed(lot_public_id, e.to_string()),
                }
            }
        });

        let results = join_all(updates).await;
        Ok(BatchResponse::from_results(results))
    }

    /// Consume lot capacity for a new shipment. The capacity guard, the
    /// counter decrement, and the shipment-list append are one conditional
    /// UPDATE so concurrent dispatches cannot lose updates or overdraw.
    pub async fn apply_shipment(
        &self,
        lot_public_id: Uuid,
        shipment_public_id: Uuid,
        sent_bora_count: i32,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET remaining_bora_count = remaining_bora_count - $2,
                shipped_bora_count = shipped_bora_count + $2,
                is_fully_shipped = (remaining_bora_count - $2 = 0 AND total_bora_count > 0),
                shipment_ids = array_append(shipment_ids, $3),
                updated_at = NOW()
            WHERE public_id = $1 AND remaining_bora_count >= $2
            "#,
        )
        .bind(lot_public_id)
        .bind(sent_bora_count)
        .bind(shipment_public_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing lot from an overdraw
            let remaining = sqlx::query_scalar::<_, i32>(
                "SELECT remaining_bora_count FROM lots WHERE public_id = $1",
            )
            .bind(lot_public_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

            return Err(AppError::CapacityExceeded {
                requested: sent_bora_count,
                remaining,
            });
        }

        Ok(())
    }

    /// Re-credit lot capacity for a deleted shipment.
    pub async fn reverse_shipment(
        &self,
        lot_public_id: Uuid,
        shipment_public_id: Uuid,
        sent_bora_count: i32,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET remaining_bora_count = remaining_bora_count + $2,
                shipped_bora_count = shipped_bora_count - $2,
                is_fully_shipped = FALSE,
                shipment_ids = array_remove(shipment_ids, $3),
                updated_at = NOW()
            WHERE public_id = $1
            "#,
        )
        .bind(lot_public_id)
        .bind(sent_bora_count)
        .bind(shipment_public_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Lot".to_string()));
        }

        Ok(())
    }
}

fn validate_update(input: &UpdateLotInput) -> AppResult<()> {
    if let Some(total) = input.total_bora_count {
        validate_total_bora_count(total).map_err(|msg| AppError::Validation {
            field: "total_bora_count".to_string(),
            message: msg.to_string(),
        })?;
    }
    for (field, value) in [
        ("moisture_cut", input.moisture_cut),
        ("qi_expense", input.qi_expense),
        ("lot_dalali_expense", input.lot_dalali_expense),
        ("other_expenses", input.other_expenses),
        ("brokerage", input.brokerage),
    ] {
        if let Some(amount) = value {
            validate_expense(amount).map_err(|msg| AppError::Validation {
                field: field.to_string(),
                message: msg.to_string(),
            })?;
        }
    }
    Ok(())
}
