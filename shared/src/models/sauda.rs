//! Sauda (deal) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sauda: one rice purchase agreement with a counterparty, brokered by a
/// registered broker. Spawns `total_lots` lots at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sauda {
    pub public_id: Uuid,
    pub name: String,
    pub broker_code: String,
    pub party_name: String,
    pub purchase_date: DateTime<Utc>,
    pub total_lots: i32,
    /// Agreed rate per quintal
    pub rate: Decimal,
    pub rice_type: Option<String>,
    pub rice_agreement: Option<String>,
    /// Stored verbatim; known values are the `SaudaStatus` variants
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Known sauda statuses. The status-update operation accepts and stores any
/// string; this enum only names the states the system itself assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaudaStatus {
    Initiated,
    ReadyForPickup,
    InTransport,
    Shipped,
    Completed,
    Cancelled,
}

impl SaudaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaudaStatus::Initiated => "INITIATED",
            SaudaStatus::ReadyForPickup => "READY_FOR_PICKUP",
            SaudaStatus::InTransport => "IN_TRANSPORT",
            SaudaStatus::Shipped => "SHIPPED",
            SaudaStatus::Completed => "COMPLETED",
            SaudaStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "INITIATED" => Some(SaudaStatus::Initiated),
            "READY_FOR_PICKUP" => Some(SaudaStatus::ReadyForPickup),
            "IN_TRANSPORT" => Some(SaudaStatus::InTransport),
            "SHIPPED" => Some(SaudaStatus::Shipped),
            "COMPLETED" => Some(SaudaStatus::Completed),
            "CANCELLED" => Some(SaudaStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SaudaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaudaStatus::Initiated => write!(f, "Initialized"),
            SaudaStatus::ReadyForPickup => write!(f, "Ready for pickup"),
            SaudaStatus::InTransport => write!(f, "In transport"),
            SaudaStatus::Shipped => write!(f, "Shipped"),
            SaudaStatus::Completed => write!(f, "Completed"),
            SaudaStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}
