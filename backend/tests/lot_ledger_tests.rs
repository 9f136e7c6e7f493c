//! Lot ledger property-based and unit tests
//!
//! Covers:
//! - Capacity conservation across arbitrary shipment create/delete sequences
//! - Capacity guard rejection of overdraws
//! - Capacity reset invalidating recorded shipments

use proptest::prelude::*;
use shared::models::BoraCounters;

// ============================================================================
// In-memory lot state mirroring the lot service contract
// ============================================================================

/// A lot's counters plus its recorded shipments, evolved the way the lot
/// service evolves the persisted row.
#[derive(Debug, Clone)]
struct LotState {
    counters: BoraCounters,
    shipments: Vec<i32>,
}

impl LotState {
    fn new(total: i32) -> Self {
        Self {
            counters: BoraCounters::new(total),
            shipments: Vec::new(),
        }
    }

    fn create_shipment(&mut self, sent: i32) -> bool {
        if self.counters.apply_shipment(sent).is_ok() {
            self.shipments.push(sent);
            true
        } else {
            false
        }
    }

    fn delete_shipment(&mut self, index: usize) -> bool {
        if index < self.shipments.len() {
            let sent = self.shipments.remove(index);
            self.counters.reverse_shipment(sent);
            true
        } else {
            false
        }
    }

    fn reset_capacity(&mut self, new_total: i32) {
        self.shipments.clear();
        self.counters.reset(new_total);
    }

    fn active_sent_total(&self) -> i32 {
        self.shipments.iter().sum()
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum LedgerOp {
    Create(i32),
    Delete(usize),
}

fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (1..=60i32).prop_map(LedgerOp::Create),
        (0..8usize).prop_map(LedgerOp::Delete),
    ]
}

proptest! {
    /// Capacity conservation: for any sequence of shipment creations and
    /// deletions, remaining + sum(active shipments) == total.
    #[test]
    fn test_capacity_conservation(
        total in 0..=200i32,
        ops in prop::collection::vec(ledger_op_strategy(), 0..40)
    ) {
        let mut lot = LotState::new(total);

        for op in ops {
            match op {
                LedgerOp::Create(sent) => { lot.create_shipment(sent); }
                LedgerOp::Delete(index) => { lot.delete_shipment(index); }
            }

            prop_assert_eq!(
                lot.counters.remaining_bora_count + lot.active_sent_total(),
                lot.counters.total_bora_count
            );
            prop_assert!(lot.counters.remaining_bora_count >= 0);
            prop_assert_eq!(lot.counters.shipped_bora_count, lot.active_sent_total());
        }
    }

    /// The guard never admits an overdraw: a rejected shipment leaves the
    /// counters untouched.
    #[test]
    fn test_overdraw_rejected_without_mutation(
        total in 0..=100i32,
        excess in 1..=50i32
    ) {
        let mut counters = BoraCounters::new(total);
        let before = counters;
        let result = counters.apply_shipment(total + excess);
        prop_assert!(result.is_err());
        prop_assert_eq!(counters, before);
    }

    /// Fully-shipped flag is set exactly when a non-empty lot has no
    /// remaining capacity.
    #[test]
    fn test_fully_shipped_flag_consistency(
        total in 1..=100i32,
        sent in 1..=100i32
    ) {
        let mut counters = BoraCounters::new(total);
        if counters.apply_shipment(sent).is_ok() {
            prop_assert_eq!(counters.is_fully_shipped, sent == total);
        }
    }

    /// Reset always invalidates: whatever was recorded, a reset lot has no
    /// shipments and full capacity at the new total.
    #[test]
    fn test_reset_invalidates_any_history(
        total in 1..=100i32,
        ops in prop::collection::vec(ledger_op_strategy(), 0..20),
        new_total in 0..=100i32
    ) {
        let mut lot = LotState::new(total);
        for op in ops {
            match op {
                LedgerOp::Create(sent) => { lot.create_shipment(sent); }
                LedgerOp::Delete(index) => { lot.delete_shipment(index); }
            }
        }

        lot.reset_capacity(new_total);

        prop_assert!(lot.shipments.is_empty());
        prop_assert_eq!(lot.counters.remaining_bora_count, new_total);
        prop_assert_eq!(lot.counters.shipped_bora_count, 0);
        prop_assert!(!lot.counters.is_fully_shipped);
    }
}

// ============================================================================
// Unit Tests: Shipment Sequences
// ============================================================================

#[cfg(test)]
mod sequence_tests {
    use super::*;

    #[test]
    fn test_create_then_delete_restores_capacity() {
        let mut lot = LotState::new(100);
        assert!(lot.create_shipment(40));
        assert!(lot.create_shipment(25));
        assert_eq!(lot.counters.remaining_bora_count, 35);

        assert!(lot.delete_shipment(0));
        assert_eq!(lot.counters.remaining_bora_count, 75);
        assert_eq!(lot.counters.shipped_bora_count, 25);
    }

    #[test]
    fn test_overdraw_after_partial_consumption() {
        let mut lot = LotState::new(50);
        assert!(lot.create_shipment(30));
        assert!(!lot.create_shipment(21));
        assert!(lot.create_shipment(20));
        assert!(lot.counters.is_fully_shipped);
    }

    #[test]
    fn test_delete_missing_shipment_is_noop() {
        let mut lot = LotState::new(50);
        assert!(lot.create_shipment(10));
        assert!(!lot.delete_shipment(5));
        assert_eq!(lot.counters.remaining_bora_count, 40);
    }
}

// ============================================================================
// Unit Tests: Capacity Reset
// ============================================================================

#[cfg(test)]
mod reset_tests {
    use super::*;

    #[test]
    fn test_reset_invalidates_shipments() {
        // Lot with 2 active shipments summing 30 bora out of 100 total
        let mut lot = LotState::new(100);
        assert!(lot.create_shipment(20));
        assert!(lot.create_shipment(10));
        assert_eq!(lot.counters.remaining_bora_count, 70);

        lot.reset_capacity(80);

        assert_eq!(lot.shipments.len(), 0);
        assert_eq!(lot.counters.remaining_bora_count, 80);
        assert_eq!(lot.counters.total_bora_count, 80);
    }

    #[test]
    fn test_reset_to_zero() {
        let mut lot = LotState::new(100);
        assert!(lot.create_shipment(100));
        assert!(lot.counters.is_fully_shipped);

        lot.reset_capacity(0);

        assert_eq!(lot.counters.remaining_bora_count, 0);
        assert!(!lot.counters.is_fully_shipped);
    }

    #[test]
    fn test_capacity_available_again_after_reset() {
        let mut lot = LotState::new(30);
        assert!(lot.create_shipment(30));
        assert!(!lot.create_shipment(1));

        lot.reset_capacity(30);
        assert!(lot.create_shipment(30));
    }
}
