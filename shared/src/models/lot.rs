//! Lot models and bora-count bookkeeping

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One shippable unit within a sauda. Carries the bora (bag) counters, the
/// purchase/expense fields, and the list of shipments recorded against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub public_id: Uuid,
    pub sauda_public_id: Uuid,
    pub rice_lot_no: Option<String>,
    pub total_bora_count: i32,
    pub shipped_bora_count: i32,
    pub remaining_bora_count: i32,
    pub is_fully_shipped: bool,
    pub shipment_ids: Vec<Uuid>,
    /// Quantity in quintals
    pub qtl: Decimal,
    pub rice_bags_quantity: i32,
    pub net_rice_bought: Decimal,
    pub moisture_cut: Decimal,
    pub rice_deposit_centre: Option<String>,
    pub rice_pass_date: Option<DateTime<Utc>>,
    pub frk: bool,
    pub frk_bheja: Option<FrkBheja>,
    pub qi_expense: Decimal,
    pub lot_dalali_expense: Decimal,
    pub other_expenses: Decimal,
    /// Brokerage rate per quintal
    pub brokerage: Decimal,
    pub nett_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// FRK (fortified rice kernel) dispatch detail. Lots record `{via, qty,
/// date}`; shipments additionally record the vehicle and transporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrkBheja {
    pub via: Option<String>,
    pub qty: Decimal,
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transporter: Option<String>,
}

/// A lot's bora counters as one value, with the bookkeeping rules that keep
/// them consistent across shipment activity.
///
/// Invariant: `remaining_bora_count + shipped_bora_count == total_bora_count`
/// holds after every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoraCounters {
    pub total_bora_count: i32,
    pub shipped_bora_count: i32,
    pub remaining_bora_count: i32,
    pub is_fully_shipped: bool,
}

/// A shipment would drive `remaining_bora_count` negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("shipment of {requested} bora exceeds remaining capacity of {remaining}")]
pub struct CapacityExceeded {
    pub requested: i32,
    pub remaining: i32,
}

impl BoraCounters {
    pub fn new(total_bora_count: i32) -> Self {
        Self {
            total_bora_count,
            shipped_bora_count: 0,
            remaining_bora_count: total_bora_count,
            is_fully_shipped: false,
        }
    }

    /// Consume capacity for a dispatch of `sent` bora.
    pub fn apply_shipment(&mut self, sent: i32) -> Result<(), CapacityExceeded> {
        if sent > self.remaining_bora_count {
            return Err(CapacityExceeded {
                requested: sent,
                remaining: self.remaining_bora_count,
            });
        }
        self.remaining_bora_count -= sent;
        self.shipped_bora_count += sent;
        self.refresh_fully_shipped();
        Ok(())
    }

    /// Re-credit capacity for a deleted shipment of `sent` bora.
    pub fn reverse_shipment(&mut self, sent: i32) {
        self.remaining_bora_count += sent;
        self.shipped_bora_count -= sent;
        self.refresh_fully_shipped();
    }

    /// Replace the total. All prior consumption was computed against the old
    /// total, so the counters start over; the caller must invalidate the
    /// lot's recorded shipments alongside this.
    pub fn reset(&mut self, new_total: i32) {
        self.total_bora_count = new_total;
        self.shipped_bora_count = 0;
        self.remaining_bora_count = new_total;
        self.is_fully_shipped = false;
    }

    fn refresh_fully_shipped(&mut self) {
        self.is_fully_shipped = self.remaining_bora_count == 0 && self.total_bora_count > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_reverse_conserve_total() {
        let mut counters = BoraCounters::new(100);
        counters.apply_shipment(30).unwrap();
        counters.apply_shipment(20).unwrap();
        assert_eq!(counters.remaining_bora_count, 50);
        assert_eq!(counters.shipped_bora_count, 50);

        counters.reverse_shipment(20);
        assert_eq!(counters.remaining_bora_count, 70);
        assert_eq!(counters.shipped_bora_count, 30);
        assert_eq!(
            counters.remaining_bora_count + counters.shipped_bora_count,
            counters.total_bora_count
        );
    }

    #[test]
    fn test_apply_rejects_over_capacity() {
        let mut counters = BoraCounters::new(10);
        let err = counters.apply_shipment(11).unwrap_err();
        assert_eq!(err.requested, 11);
        assert_eq!(err.remaining, 10);
        // counters untouched on rejection
        assert_eq!(counters.remaining_bora_count, 10);
        assert_eq!(counters.shipped_bora_count, 0);
    }

    #[test]
    fn test_fully_shipped_flag() {
        let mut counters = BoraCounters::new(10);
        counters.apply_shipment(10).unwrap();
        assert!(counters.is_fully_shipped);

        counters.reverse_shipment(10);
        assert!(!counters.is_fully_shipped);
    }

    #[test]
    fn test_zero_total_never_fully_shipped() {
        let counters = BoraCounters::new(0);
        assert!(!counters.is_fully_shipped);
        assert_eq!(counters.remaining_bora_count, 0);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut counters = BoraCounters::new(100);
        counters.apply_shipment(30).unwrap();
        counters.reset(80);
        assert_eq!(counters.total_bora_count, 80);
        assert_eq!(counters.remaining_bora_count, 80);
        assert_eq!(counters.shipped_bora_count, 0);
        assert!(!counters.is_fully_shipped);
    }
}
