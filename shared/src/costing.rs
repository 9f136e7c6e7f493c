//! Nett-amount costing for a lot
//!
//! The one genuinely load-bearing calculation in the system: gross value at
//! the deal rate minus itemized expenses and brokerage, where quantity
//! diverted to the FRK stream is excluded from the brokerage base.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs to the nett-amount calculation for one lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostInputs {
    /// Deal rate per quintal
    pub rate: Decimal,
    /// Lot quantity in quintals
    pub qtl: Decimal,
    pub moisture_cut: Decimal,
    pub qi_expense: Decimal,
    pub lot_dalali_expense: Decimal,
    pub other_expenses: Decimal,
    /// Brokerage rate per quintal
    pub brokerage: Decimal,
    /// Quantity diverted to the FRK stream; zero when not applicable
    pub frk_qty: Decimal,
}

/// Full breakdown of one lot's nett amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub effective_qtl: Decimal,
    pub gross_amount: Decimal,
    pub total_brokerage: Decimal,
    pub total_expenses: Decimal,
    pub nett_amount: Decimal,
}

/// Compute a lot's nett amount.
///
/// Brokerage applies to the quantity net of any FRK diversion; the gross
/// amount always uses the full quantity. A negative result is a recordable
/// business condition, not an error, and is never clamped.
pub fn compute_nett_amount(inputs: &CostInputs) -> CostBreakdown {
    let effective_qtl = if inputs.frk_qty > Decimal::ZERO {
        inputs.qtl - inputs.frk_qty
    } else {
        inputs.qtl
    };
    let total_brokerage = effective_qtl * inputs.brokerage;
    let gross_amount = inputs.qtl * inputs.rate;
    let total_expenses = inputs.qi_expense
        + inputs.lot_dalali_expense
        + inputs.other_expenses
        + inputs.moisture_cut
        + total_brokerage;

    CostBreakdown {
        effective_qtl,
        gross_amount,
        total_brokerage,
        total_expenses,
        nett_amount: gross_amount - total_expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> CostInputs {
        CostInputs {
            rate: Decimal::from(2000),
            qtl: Decimal::from(100),
            moisture_cut: Decimal::from(10),
            qi_expense: Decimal::from(50),
            lot_dalali_expense: Decimal::from(30),
            other_expenses: Decimal::from(20),
            brokerage: Decimal::from(3),
            frk_qty: Decimal::ZERO,
        }
    }

    #[test]
    fn test_nett_amount_without_frk() {
        let breakdown = compute_nett_amount(&base_inputs());
        assert_eq!(breakdown.gross_amount, Decimal::from(200_000));
        assert_eq!(breakdown.total_brokerage, Decimal::from(300));
        assert_eq!(breakdown.total_expenses, Decimal::from(410));
        assert_eq!(breakdown.nett_amount, Decimal::from(199_590));
    }

    #[test]
    fn test_frk_diversion_shrinks_brokerage_base() {
        let mut inputs = base_inputs();
        inputs.frk_qty = Decimal::from(20);
        let breakdown = compute_nett_amount(&inputs);
        assert_eq!(breakdown.effective_qtl, Decimal::from(80));
        assert_eq!(breakdown.total_brokerage, Decimal::from(240));
        // gross still uses the full quantity
        assert_eq!(breakdown.gross_amount, Decimal::from(200_000));
        assert_eq!(breakdown.nett_amount, Decimal::from(199_650));
    }

    #[test]
    fn test_zero_frk_qty_leaves_quantity_untouched() {
        let breakdown = compute_nett_amount(&base_inputs());
        assert_eq!(breakdown.effective_qtl, Decimal::from(100));
    }

    #[test]
    fn test_negative_nett_amount_is_not_clamped() {
        let mut inputs = base_inputs();
        inputs.rate = Decimal::ONE;
        inputs.qi_expense = Decimal::from(500);
        let breakdown = compute_nett_amount(&inputs);
        assert_eq!(breakdown.gross_amount, Decimal::from(100));
        assert!(breakdown.nett_amount < Decimal::ZERO);
    }
}
