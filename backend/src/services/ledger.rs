//! Broker ledger service: postings and the aggregate cost-estimate flow

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::deal::DealService;
use crate::services::lot::LotService;
use shared::costing::{compute_nett_amount, CostInputs};
use shared::models::{FrkBheja, LedgerEntry, LedgerEntryType};
use shared::validation::{validate_expense, validate_ledger_amount};

const ENTRY_COLUMNS: &str = "public_id, broker_code, sauda_public_id, sauda_name, entry_date, \
     entry_type, amount, payment_mode, remarks, created_at";

/// Ledger service for broker postings and per-deal cost estimation
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Input for posting a ledger entry
#[derive(Debug, Deserialize)]
pub struct PostEntryInput {
    pub sauda_public_id: Option<Uuid>,
    pub sauda_name: Option<String>,
    pub entry_date: Option<DateTime<Utc>>,
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub payment_mode: Option<String>,
    pub remarks: Option<String>,
}

/// Per-lot expense patch applied during cost estimation. Absent fields keep
/// the lot's stored value.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExpensePatch {
    pub moisture_cut: Option<Decimal>,
    pub qi_expense: Option<Decimal>,
    pub lot_dalali_expense: Option<Decimal>,
    pub other_expenses: Option<Decimal>,
    pub brokerage: Option<Decimal>,
}

/// Input for the cost-estimate operation
#[derive(Debug, Deserialize)]
pub struct CostEstimateInput {
    pub broker_code: String,
    pub lot_public_ids: Vec<Uuid>,
    #[serde(default)]
    pub expenses: ExpensePatch,
}

/// One lot's computed nett amount within a cost-estimate pass
#[derive(Debug, Clone, Serialize)]
pub struct LotNettAmount {
    pub lot_public_id: Uuid,
    pub rice_lot_no: Option<String>,
    pub nett_amount: Decimal,
}

/// Result of a cost-estimate pass: per-lot nett amounts plus the single
/// aggregate debit posted against the broker
#[derive(Debug, Clone, Serialize)]
pub struct CostEstimateResult {
    pub sauda_public_id: Uuid,
    pub total_nett_amount: Decimal,
    pub lots: Vec<LotNettAmount>,
    pub ledger_entry: LedgerEntry,
}

#[derive(Debug, FromRow)]
struct EntryRow {
    public_id: Uuid,
    broker_code: String,
    sauda_public_id: Option<Uuid>,
    sauda_name: Option<String>,
    entry_date: DateTime<Utc>,
    entry_type: String,
    amount: Decimal,
    payment_mode: Option<String>,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EntryRow> for LedgerEntry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let entry_type = LedgerEntryType::from_str(&row.entry_type).ok_or_else(|| {
            AppError::Internal(format!("unknown ledger entry type: {}", row.entry_type))
        })?;
        Ok(LedgerEntry {
            public_id: row.public_id,
            broker_code: row.broker_code,
            sauda_public_id: row.sauda_public_id,
            sauda_name: row.sauda_name,
            entry_date: row.entry_date,
            entry_type,
            amount: row.amount,
            payment_mode: row.payment_mode,
            remarks: row.remarks,
            created_at: row.created_at,
        })
    }
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Post one entry against a broker and update the broker's running
    /// totals per the entry type (an adjustment increments both sides).
    pub async fn post_entry(
        &self,
        broker_code: &str,
        input: PostEntryInput,
    ) -> AppResult<LedgerEntry> {
        validate_ledger_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;

        let broker_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM brokers WHERE broker_code = $1)",
        )
        .bind(broker_code)
        .fetch_one(&self.db)
        .await?;

        if !broker_exists {
            return Err(AppError::NotFound("Broker".to_string()));
        }

        let entry_date = input.entry_date.unwrap_or_else(Utc::now);

        let row = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            INSERT INTO broker_ledger_entries (
                broker_code, sauda_public_id, sauda_name, entry_date, entry_type,
                amount, payment_mode, remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(broker_code)
        .bind(input.sauda_public_id)
        .bind(&input.sauda_name)
        .bind(entry_date)
        .bind(input.entry_type.as_str())
        .bind(input.amount)
        .bind(&input.payment_mode)
        .bind(&input.remarks)
        .fetch_one(&self.db)
        .await?;

        let (credit_delta, debit_delta) = input.entry_type.total_deltas(input.amount);
        sqlx::query(
            r#"
            UPDATE brokers
            SET total_credits = total_credits + $1,
                total_debits = total_debits + $2,
                updated_at = NOW()
            WHERE broker_code = $3
            "#,
        )
        .bind(credit_delta)
        .bind(debit_delta)
        .bind(broker_code)
        .execute(&self.db)
        .await?;

        row.try_into()
    }

    /// List all entries posted against a broker, newest first
    pub async fn list_entries(&self, broker_code: &str) -> AppResult<Vec<LedgerEntry>> {
        let broker_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM brokers WHERE broker_code = $1)",
        )
        .bind(broker_code)
        .fetch_one(&self.db)
        .await?;

        if !broker_exists {
            return Err(AppError::NotFound("Broker".to_string()));
        }

        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM broker_ledger_entries
            WHERE broker_code = $1
            ORDER BY entry_date DESC, created_at DESC
            "#
        ))
        .bind(broker_code)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }

    /// Run a cost-estimation pass over a deal's lots.
    ///
    /// Each lot gets the expense patch merged in, its nett amount computed
    /// at the deal rate (with any FRK quantity from its most recent FRK
    /// shipment excluded from the brokerage base) and persisted. The nett
    /// amounts sum to one aggregate DEBIT posting against the broker: a
    /// single entry per pass, not one per lot.
    pub async fn post_cost_estimate(
        &self,
        sauda_public_id: Uuid,
        input: CostEstimateInput,
    ) -> AppResult<CostEstimateResult> {
        validate_patch(&input.expenses)?;

        if input.lot_public_ids.is_empty() {
            return Err(AppError::Validation {
                field: "lot_public_ids".to_string(),
                message: "At least one lot is required".to_string(),
            });
        }

        let deal = DealService::new(self.db.clone())
            .get_deal(sauda_public_id)
            .await?;

        let broker_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM brokers WHERE broker_code = $1)",
        )
        .bind(&input.broker_code)
        .fetch_one(&self.db)
        .await?;

        if !broker_exists {
            return Err(AppError::NotFound("Broker".to_string()));
        }

        let lot_service = LotService::new(self.db.clone());
        let mut total_nett_amount = Decimal::ZERO;
        let mut lots = Vec::with_capacity(input.lot_public_ids.len());

        for lot_public_id in &input.lot_public_ids {
            let lot = lot_service.get_lot(sauda_public_id, *lot_public_id).await?;

            let frk_qty = if lot.frk {
                self.latest_frk_qty(*lot_public_id).await?
            } else {
                Decimal::ZERO
            };

            let moisture_cut = input.expenses.moisture_cut.unwrap_or(lot.moisture_cut);
            let qi_expense = input.expenses.qi_expense.unwrap_or(lot.qi_expense);
            let lot_dalali_expense = input
                .expenses
                .lot_dalali_expense
                .unwrap_or(lot.lot_dalali_expense);
            let other_expenses = input.expenses.other_expenses.unwrap_or(lot.other_expenses);
            let brokerage = input.expenses.brokerage.unwrap_or(lot.brokerage);

            let breakdown = compute_nett_amount(&CostInputs {
                rate: deal.rate,
                qtl: lot.qtl,
                moisture_cut,
                qi_expense,
                lot_dalali_expense,
                other_expenses,
                brokerage,
                frk_qty,
            });

            sqlx::query(
                r#"
                UPDATE lots
                SET moisture_cut = $1, qi_expense = $2, lot_dalali_expense = $3,
                    other_expenses = $4, brokerage = $5, nett_amount = $6, updated_at = NOW()
                WHERE public_id = $7
                "#,
            )
            .bind(moisture_cut)
            .bind(qi_expense)
            .bind(lot_dalali_expense)
            .bind(other_expenses)
            .bind(brokerage)
            .bind(breakdown.nett_amount)
            .bind(lot_public_id)
            .execute(&self.db)
            .await?;

            total_nett_amount += breakdown.nett_amount;
            lots.push(LotNettAmount {
                lot_public_id: *lot_public_id,
                rice_lot_no: lot.rice_lot_no,
                nett_amount: breakdown.nett_amount,
            });
        }

        let ledger_entry = self
            .post_entry(
                &input.broker_code,
                PostEntryInput {
                    sauda_public_id: Some(sauda_public_id),
                    sauda_name: Some(deal.name),
                    entry_date: None,
                    entry_type: LedgerEntryType::Debit,
                    amount: total_nett_amount,
                    payment_mode: None,
                    remarks: Some(format!("Cost estimate for {} lots", lots.len())),
                },
            )
            .await?;

        Ok(CostEstimateResult {
            sauda_public_id,
            total_nett_amount,
            lots,
            ledger_entry,
        })
    }

    /// FRK quantity from the lot's most recent FRK shipment, zero when none
    /// is recorded
    async fn latest_frk_qty(&self, lot_public_id: Uuid) -> AppResult<Decimal> {
        let bheja = sqlx::query_scalar::<_, Option<Json<FrkBheja>>>(
            r#"
            SELECT frk_bheja FROM shipments
            WHERE lot_public_id = $1 AND frk = TRUE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(lot_public_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(bheja.flatten().map(|j| j.0.qty).unwrap_or(Decimal::ZERO))
    }
}

fn validate_patch(patch: &ExpensePatch) -> AppResult<()> {
    for (field, value) in [
        ("moisture_cut", patch.moisture_cut),
        ("qi_expense", patch.qi_expense),
        ("lot_dalali_expense", patch.lot_dalali_expense),
        ("other_expenses", patch.other_expenses),
        ("brokerage", patch.brokerage),
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
