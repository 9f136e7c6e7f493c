//! Deal analytics fold tests

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use shared::models::{fold_deal_analytics, FrkBheja, Lot, LotProgressRow, Shipment};
use uuid::Uuid;

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap()
}

fn make_lot(total: i32, shipped: i32) -> Lot {
    Lot {
        public_id: Uuid::new_v4(),
        sauda_public_id: Uuid::new_v4(),
        rice_lot_no: Some("LOT-1".to_string()),
        total_bora_count: total,
        shipped_bora_count: shipped,
        remaining_bora_count: total - shipped,
        is_fully_shipped: total > 0 && shipped == total,
        shipment_ids: Vec::new(),
        qtl: Decimal::from(100),
        rice_bags_quantity: 50,
        net_rice_bought: Decimal::from(100),
        moisture_cut: Decimal::ZERO,
        rice_deposit_centre: None,
        rice_pass_date: None,
        frk: false,
        frk_bheja: None,
        qi_expense: Decimal::ZERO,
        lot_dalali_expense: Decimal::ZERO,
        other_expenses: Decimal::ZERO,
        brokerage: Decimal::from(3),
        nett_amount: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

fn make_shipment(sent: i32) -> Shipment {
    Shipment {
        public_id: Uuid::new_v4(),
        lot_public_id: Uuid::new_v4(),
        sauda_public_id: Uuid::new_v4(),
        sent_bora_count: sent,
        shipping_date: Some(fixed_time()),
        shipped_via: Some("Truck".to_string()),
        flap_sticker_date: None,
        flap_sticker_via: None,
        gate_pass_date: None,
        gate_pass_via: None,
        frk: false,
        frk_bheja: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

fn complete_frk_detail() -> FrkBheja {
    FrkBheja {
        via: Some("Truck".to_string()),
        qty: Decimal::from(20),
        date: Some(fixed_time()),
        vehicle: Some("CG07AB1234".to_string()),
        transporter: Some("Sharma Logistics".to_string()),
    }
}

#[test]
fn test_zero_state_deal() {
    // Deal created with total_lots = 5 but no lots materialized yet
    let sauda_public_id = Uuid::new_v4();
    let analytics = fold_deal_analytics(sauda_public_id, 5, &[]);

    assert_eq!(analytics.bora.shipped, 0);
    assert_eq!(analytics.bora.total, 0);
    assert_eq!(analytics.flap_sticker.completed, 0);
    assert_eq!(analytics.flap_sticker.total, 5);
    assert_eq!(analytics.gate_pass.completed, 0);
    assert_eq!(analytics.gate_pass.total, 5);
    assert!(analytics.frk.is_none());
}

#[test]
fn test_bora_progress_sums_across_lots() {
    let lots = vec![
        (make_lot(100, 40), vec![make_shipment(40)]),
        (make_lot(80, 80), vec![make_shipment(50), make_shipment(30)]),
        (make_lot(60, 0), vec![]),
    ];
    let analytics = fold_deal_analytics(Uuid::new_v4(), 3, &lots);

    assert_eq!(analytics.bora.shipped, 120);
    assert_eq!(analytics.bora.total, 240);
}

#[test]
fn test_flap_sticker_and_gate_pass_counted_per_lot() {
    let mut stickered = make_shipment(10);
    stickered.flap_sticker_date = Some(fixed_time());
    stickered.flap_sticker_via = Some("Sticker Batch #32".to_string());

    let mut passed = make_shipment(10);
    passed.gate_pass_date = Some(fixed_time());
    passed.gate_pass_via = Some("Gate 2".to_string());

    let lots = vec![
        // One lot with a sticker on one of two shipments
        (make_lot(50, 20), vec![stickered, make_shipment(10)]),
        // One lot with a gate pass
        (make_lot(50, 10), vec![passed]),
        // One lot with neither
        (make_lot(50, 10), vec![make_shipment(10)]),
    ];
    let analytics = fold_deal_analytics(Uuid::new_v4(), 3, &lots);

    assert_eq!(analytics.flap_sticker.completed, 1);
    assert_eq!(analytics.flap_sticker.total, 3);
    assert_eq!(analytics.gate_pass.completed, 1);
    assert_eq!(analytics.gate_pass.total, 3);
}

#[test]
fn test_frk_progress_present_only_with_frk_lots() {
    let mut frk_incomplete = make_shipment(10);
    frk_incomplete.frk = true;
    frk_incomplete.frk_bheja = Some(FrkBheja {
        vehicle: None,
        ..complete_frk_detail()
    });

    let mut frk_complete = make_shipment(10);
    frk_complete.frk = true;
    frk_complete.frk_bheja = Some(complete_frk_detail());

    let lots = vec![
        (make_lot(50, 10), vec![frk_incomplete]),
        (make_lot(50, 10), vec![frk_complete]),
        (make_lot(50, 0), vec![]),
    ];
    let analytics = fold_deal_analytics(Uuid::new_v4(), 3, &lots);

    let frk = analytics.frk.expect("frk progress should be present");
    assert_eq!(frk.total, 2);
    assert_eq!(frk.completed, 1);
}

#[test]
fn test_no_frk_shipments_omits_frk_progress() {
    let lots = vec![(make_lot(50, 10), vec![make_shipment(10)])];
    let analytics = fold_deal_analytics(Uuid::new_v4(), 1, &lots);
    assert!(analytics.frk.is_none());
}

#[test]
fn test_lot_progress_row_derivation() {
    let mut shipment = make_shipment(25);
    shipment.flap_sticker_date = Some(fixed_time());
    shipment.flap_sticker_via = Some("Batch 9".to_string());
    shipment.frk = true;

    let lot = make_lot(100, 25);
    let row = LotProgressRow::derive(&lot, &[shipment]);

    assert_eq!(row.total_bora_count, 100);
    assert_eq!(row.shipped_bora_count, 25);
    assert_eq!(row.remaining_bora_count, 75);
    assert!(row.has_flap_sticker);
    assert!(!row.has_gate_pass);
    assert!(row.frk_enabled);
    assert!(!row.frk_complete);
}
