//! Per-deal progress analytics

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lot::Lot;
use super::shipment::Shipment;

/// A completed-out-of-total pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: i64,
    pub total: i64,
}

/// Bora dispatch progress across a deal's lots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoraProgress {
    pub shipped: i64,
    pub total: i64,
}

/// Per-deal progress rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAnalytics {
    pub sauda_public_id: Uuid,
    pub total_lots: i64,
    pub bora: BoraProgress,
    pub flap_sticker: Progress,
    pub gate_pass: Progress,
    /// Present only when at least one lot has an FRK shipment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frk: Option<Progress>,
}

/// One lot's progress, used for tabular display and CSV export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotProgressRow {
    pub lot_public_id: Uuid,
    pub rice_lot_no: Option<String>,
    pub total_bora_count: i32,
    pub shipped_bora_count: i32,
    pub remaining_bora_count: i32,
    pub has_flap_sticker: bool,
    pub has_gate_pass: bool,
    pub frk_enabled: bool,
    pub frk_complete: bool,
}

impl LotProgressRow {
    /// Derive one lot's progress from its shipments.
    pub fn derive(lot: &Lot, shipments: &[Shipment]) -> Self {
        Self {
            lot_public_id: lot.public_id,
            rice_lot_no: lot.rice_lot_no.clone(),
            total_bora_count: lot.total_bora_count,
            shipped_bora_count: lot.shipped_bora_count,
            remaining_bora_count: lot.remaining_bora_count,
            has_flap_sticker: shipments.iter().any(Shipment::has_flap_sticker),
            has_gate_pass: shipments.iter().any(Shipment::has_gate_pass),
            frk_enabled: shipments.iter().any(|s| s.frk),
            frk_complete: shipments.iter().any(Shipment::has_frk_complete),
        }
    }
}

/// Fold a deal's lots and their shipments into the per-deal rollup.
///
/// A deal with no lots or shipments reports all-zero progress; the FRK
/// section is omitted entirely unless some lot has an FRK shipment.
pub fn fold_deal_analytics(
    sauda_public_id: Uuid,
    total_lots: i32,
    lots: &[(Lot, Vec<Shipment>)],
) -> DealAnalytics {
    let rows: Vec<LotProgressRow> = lots
        .iter()
        .map(|(lot, shipments)| LotProgressRow::derive(lot, shipments))
        .collect();

    let shipped: i64 = rows.iter().map(|r| i64::from(r.shipped_bora_count)).sum();
    let total: i64 = rows.iter().map(|r| i64::from(r.total_bora_count)).sum();
    let frk_enabled = rows.iter().filter(|r| r.frk_enabled).count() as i64;

    DealAnalytics {
        sauda_public_id,
        total_lots: i64::from(total_lots),
        bora: BoraProgress { shipped, total },
        flap_sticker: Progress {
            completed: rows.iter().filter(|r| r.has_flap_sticker).count() as i64,
            total: i64::from(total_lots),
        },
        gate_pass: Progress {
            completed: rows.iter().filter(|r| r.has_gate_pass).count() as i64,
            total: i64::from(total_lots),
        },
        frk: (frk_enabled > 0).then(|| Progress {
            completed: rows.iter().filter(|r| r.frk_complete).count() as i64,
            total: frk_enabled,
        }),
    }
}
