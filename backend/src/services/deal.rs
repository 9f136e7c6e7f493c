//! Sauda (deal) management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::{Sauda, SaudaStatus};
use shared::validation::validate_rate;

const SAUDA_COLUMNS: &str = "public_id, name, broker_code, party_name, purchase_date, \
     total_lots, rate, rice_type, rice_agreement, status, created_at, updated_at, completed_at";

/// Deal service for managing saudas and their lifecycle
#[derive(Clone)]
pub struct DealService {
    db: PgPool,
}

/// Input for creating a sauda
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDealInput {
    #[validate(length(min = 1, message = "Sauda name cannot be empty"))]
    pub name: String,
    pub broker_code: String,
    #[validate(length(min = 1, message = "Party name cannot be empty"))]
    pub party_name: String,
    pub purchase_date: DateTime<Utc>,
    pub total_lots: i32,
    pub rate: Decimal,
    pub rice_type: Option<String>,
    pub rice_agreement: Option<String>,
}

/// Input for the status-update operation. The status is stored verbatim;
/// there is no validated transition table.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
}

#[derive(Debug, FromRow)]
struct SaudaRow {
    public_id: Uuid,
    name: String,
    broker_code: String,
    party_name: String,
    purchase_date: DateTime<Utc>,
    total_lots: i32,
    rate: Decimal,
    rice_type: Option<String>,
    rice_agreement: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<SaudaRow> for Sauda {
    fn from(row: SaudaRow) -> Self {
        Sauda {
            public_id: row.public_id,
            name: row.name,
            broker_code: row.broker_code,
            party_name: row.party_name,
            purchase_date: row.purchase_date,
            total_lots: row.total_lots,
            rate: row.rate,
            rice_type: row.rice_type,
            rice_agreement: row.rice_agreement,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        }
    }
}

impl DealService {
    /// Create a new DealService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a sauda and spawn its lots. `total_lots` is fixed at creation
    /// and determines how many pre-labeled lots are inserted alongside the
    /// deal; the broker's deal list is extended in the same transaction.
    pub async fn create_deal(&self, input: CreateDealInput) -> AppResult<Sauda> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        validate_rate(input.rate).map_err(|msg| AppError::Validation {
            field: "rate".to_string(),
            message: msg.to_string(),
        })?;
        if input.total_lots < 0 {
            return Err(AppError::Validation {
                field: "total_lots".to_string(),
                message: "Total lots cannot be negative".to_string(),
            });
        }

        let broker_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM brokers WHERE broker_code = $1)",
        )
        .bind(&input.broker_code)
        .fetch_one(&self.db)
        .await?;

        if !broker_exists {
            return Err(AppError::NotFound("Broker".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, SaudaRow>(&format!(
            r#"
            INSERT INTO saudas (name, broker_code, party_name, purchase_date, total_lots,
                                rate, rice_type, rice_agreement, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SAUDA_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.broker_code)
        .bind(&input.party_name)
        .bind(input.purchase_date)
        .bind(input.total_lots)
        .bind(input.rate)
        .bind(&input.rice_type)
        .bind(&input.rice_agreement)
        .bind(SaudaStatus::Initiated.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for lot_number in 1..=input.total_lots {
            sqlx::query(
                r#"
                INSERT INTO lots (sauda_public_id, rice_lot_no)
                VALUES ($1, $2)
                "#,
            )
            .bind(row.public_id)
            .bind(format!("LOT-{}", lot_number))
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE brokers
            SET sauda_ids = array_append(sauda_ids, $1), updated_at = NOW()
            WHERE broker_code = $2
            "#,
        )
        .bind(row.public_id)
        .bind(&input.broker_code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(sauda = %row.public_id, lots = input.total_lots, "sauda created");

        Ok(row.into())
    }

    /// List all saudas
    pub async fn list_deals(&self) -> AppResult<Vec<Sauda>> {
        let rows = sqlx::query_as::<_, SaudaRow>(&format!(
            "SELECT {SAUDA_COLUMNS} FROM saudas ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Sauda::from).collect())
    }

    /// Get a sauda by its public id
    pub async fn get_deal(&self, sauda_public_id: Uuid) -> AppResult<Sauda> {
        let row = sqlx::query_as::<_, SaudaRow>(&format!(
            "SELECT {SAUDA_COLUMNS} FROM saudas WHERE public_id = $1"
        ))
        .bind(sauda_public_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sauda".to_string()))?;

        Ok(row.into())
    }

    /// Store a new status verbatim. COMPLETED also stamps the completion
    /// timestamp.
    pub async fn update_status(
        &self,
        sauda_public_id: Uuid,
        input: UpdateStatusInput,
    ) -> AppResult<Sauda> {
        if input.status.trim().is_empty() {
            return Err(AppError::Validation {
                field: "status".to_string(),
                message: "Status cannot be empty".to_string(),
            });
        }

        let completes = SaudaStatus::from_str(&input.status) == Some(SaudaStatus::Completed);

        let row = sqlx::query_as::<_, SaudaRow>(&format!(
            r#"
            UPDATE saudas
            SET status = $1,
                completed_at = CASE WHEN $2 THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE public_id = $3
            RETURNING {SAUDA_COLUMNS}
            "#
        ))
        .bind(&input.status)
        .bind(completes)
        .bind(sauda_public_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sauda".to_string()))?;

        Ok(row.into())
    }

    /// Push the deal to IN_TRANSPORT. Invoked on every shipment creation,
    /// regardless of the deal's current status.
    pub async fn mark_in_transport(&self, sauda_public_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE saudas SET status = $1, updated_at = NOW() WHERE public_id = $2",
        )
        .bind(SaudaStatus::InTransport.as_str())
        .bind(sauda_public_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Sauda".to_string()));
        }

        Ok(())
    }

    /// Delete a sauda, cascading to its lots and shipments, and pull it
    /// from the owning broker's deal list.
    pub async fn delete_deal(&self, sauda_public_id: Uuid) -> AppResult<()> {
        let deal = self.get_deal(sauda_public_id).await?;

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM shipments WHERE sauda_public_id = $1")
            .bind(sauda_public_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM lots WHERE sauda_public_id = $1")
            .bind(sauda_public_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM saudas WHERE public_id = $1")
            .bind(sauda_public_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE brokers
            SET sauda_ids = array_remove(sauda_ids, $1), updated_at = NOW()
            WHERE broker_code = $2
            "#,
        )
        .bind(sauda_public_id)
        .bind(&deal.broker_code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(sauda = %sauda_public_id, "sauda deleted with lots and shipments");

        Ok(())
    }
}
