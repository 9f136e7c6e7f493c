//! Broker management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::Broker;
use shared::validation::validate_broker_code;

/// Broker service for managing trading intermediaries
#[derive(Clone)]
pub struct BrokerService {
    db: PgPool,
}

/// Input for creating a broker
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBrokerInput {
    pub broker_code: String,
    #[validate(length(min = 1, message = "Broker name cannot be empty"))]
    pub name: String,
}

#[derive(Debug, FromRow)]
struct BrokerRow {
    public_id: Uuid,
    broker_code: String,
    name: String,
    sauda_ids: Vec<Uuid>,
    total_credits: Decimal,
    total_debits: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BrokerRow> for Broker {
    fn from(row: BrokerRow) -> Self {
        Broker {
            public_id: row.public_id,
            broker_code: row.broker_code,
            name: row.name,
            sauda_ids: row.sauda_ids,
            total_credits: row.total_credits,
            total_debits: row.total_debits,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl BrokerService {
    /// Create a new BrokerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a broker. The broker code is caller-supplied and must be
    /// unique; duplicates are rejected before the insert is attempted.
    pub async fn create_broker(&self, input: CreateBrokerInput) -> AppResult<Broker> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        validate_broker_code(&input.broker_code).map_err(|msg| AppError::Validation {
            field: "broker_code".to_string(),
            message: msg.to_string(),
        })?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM brokers WHERE broker_code = $1)",
        )
        .bind(&input.broker_code)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("broker_code".to_string()));
        }

        let row = sqlx::query_as::<_, BrokerRow>(
            r#"
            INSERT INTO brokers (broker_code, name)
            VALUES ($1, $2)
            RETURNING public_id, broker_code, name, sauda_ids, total_credits, total_debits,
                      created_at, updated_at
            "#,
        )
        .bind(&input.broker_code)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List all brokers
    pub async fn list_brokers(&self) -> AppResult<Vec<Broker>> {
        let rows = sqlx::query_as::<_, BrokerRow>(
            r#"
            SELECT public_id, broker_code, name, sauda_ids, total_credits, total_debits,
                   created_at, updated_at
            FROM brokers
            ORDER BY broker_code ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Broker::from).collect())
    }

    /// Get a broker by its code
    pub async fn get_broker(&self, broker_code: &str) -> AppResult<Broker> {
        let row = sqlx::query_as::<_, BrokerRow>(
            r#"
            SELECT public_id, broker_code, name, sauda_ids, total_credits, total_debits,
                   created_at, updated_at
            FROM brokers
            WHERE broker_code = $1
            "#,
        )
        .bind(broker_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Broker".to_string()))?;

        Ok(row.into())
    }
}
