//! Broker and broker-ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A trading intermediary. `broker_code` is the user-supplied identifier
/// saudas reference; it is unique across the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broker {
    pub public_id: Uuid,
    pub broker_code: String,
    pub name: String,
    pub sauda_ids: Vec<Uuid>,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One financial posting against a broker. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub public_id: Uuid,
    pub broker_code: String,
    pub sauda_public_id: Option<Uuid>,
    /// Denormalized for display
    pub sauda_name: Option<String>,
    pub entry_date: DateTime<Utc>,
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub payment_mode: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    Debit,
    Credit,
    Adjustment,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Debit => "DEBIT",
            LedgerEntryType::Credit => "CREDIT",
            LedgerEntryType::Adjustment => "ADJUSTMENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DEBIT" => Some(LedgerEntryType::Debit),
            "CREDIT" => Some(LedgerEntryType::Credit),
            "ADJUSTMENT" => Some(LedgerEntryType::Adjustment),
            _ => None,
        }
    }

    /// How a posting of `amount` lands on the broker's running totals,
    /// as `(credit_delta, debit_delta)`. An adjustment hits both sides.
    pub fn total_deltas(&self, amount: Decimal) -> (Decimal, Decimal) {
        match self {
            LedgerEntryType::Credit => (amount, Decimal::ZERO),
            LedgerEntryType::Debit => (Decimal::ZERO, amount),
            LedgerEntryType::Adjustment => (amount, amount),
        }
    }
}
