//! Shipment models and progress predicates

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lot::FrkBheja;

/// One recorded dispatch event against a lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub public_id: Uuid,
    pub lot_public_id: Uuid,
    pub sauda_public_id: Uuid,
    pub sent_bora_count: i32,
    pub shipping_date: Option<DateTime<Utc>>,
    pub shipped_via: Option<String>,
    pub flap_sticker_date: Option<DateTime<Utc>>,
    pub flap_sticker_via: Option<String>,
    pub gate_pass_date: Option<DateTime<Utc>>,
    pub gate_pass_via: Option<String>,
    pub frk: bool,
    pub frk_bheja: Option<FrkBheja>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn present(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some(v) if !v.trim().is_empty())
}

impl Shipment {
    /// Both a flap-sticker date and method are recorded.
    pub fn has_flap_sticker(&self) -> bool {
        self.flap_sticker_date.is_some() && present(&self.flap_sticker_via)
    }

    /// Both a gate-pass date and method are recorded.
    pub fn has_gate_pass(&self) -> bool {
        self.gate_pass_date.is_some() && present(&self.gate_pass_via)
    }

    /// The FRK flag is set and all five detail sub-fields (date, via,
    /// vehicle, transporter, quantity) are populated.
    pub fn has_frk_complete(&self) -> bool {
        if !self.frk {
            return false;
        }
        match &self.frk_bheja {
            Some(bheja) => {
                bheja.date.is_some()
                    && present(&bheja.via)
                    && present(&bheja.vehicle)
                    && present(&bheja.transporter)
                    && bheja.qty > Decimal::ZERO
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blank_shipment() -> Shipment {
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        Shipment {
            public_id: Uuid::nil(),
            lot_public_id: Uuid::nil(),
            sauda_public_id: Uuid::nil(),
            sent_bora_count: 10,
            shipping_date: None,
            shipped_via: None,
            flap_sticker_date: None,
            flap_sticker_via: None,
            gate_pass_date: None,
            gate_pass_via: None,
            frk: false,
            frk_bheja: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_flap_sticker_needs_date_and_via() {
        let mut shipment = blank_shipment();
        assert!(!shipment.has_flap_sticker());

        shipment.flap_sticker_date = Some(shipment.created_at);
        assert!(!shipment.has_flap_sticker());

        shipment.flap_sticker_via = Some("Sticker Batch #32".to_string());
        assert!(shipment.has_flap_sticker());
    }

    #[test]
    fn test_gate_pass_blank_via_is_incomplete() {
        let mut shipment = blank_shipment();
        shipment.gate_pass_date = Some(shipment.created_at);
        shipment.gate_pass_via = Some("  ".to_string());
        assert!(!shipment.has_gate_pass());
    }

    #[test]
    fn test_frk_complete_requires_all_five_fields() {
        let mut shipment = blank_shipment();
        shipment.frk = true;
        shipment.frk_bheja = Some(FrkBheja {
            via: Some("Truck".to_string()),
            qty: Decimal::from(20),
            date: Some(shipment.created_at),
            vehicle: Some("CG07AB1234".to_string()),
            transporter: None,
        });
        assert!(!shipment.has_frk_complete());

        if let Some(bheja) = shipment.frk_bheja.as_mut() {
            bheja.transporter = Some("Sharma Logistics".to_string());
        }
        assert!(shipment.has_frk_complete());
    }

    #[test]
    fn test_frk_detail_without_flag_is_incomplete() {
        let mut shipment = blank_shipment();
        shipment.frk_bheja = Some(FrkBheja {
            via: Some("Truck".to_string()),
            qty: Decimal::from(20),
            date: Some(shipment.created_at),
            vehicle: Some("CG07AB1234".to_string()),
            transporter: Some("Sharma Logistics".to_string()),
        });
        assert!(!shipment.has_frk_complete());
    }
}
