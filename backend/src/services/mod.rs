//! Business logic services for the Sauda Management Platform

pub mod analytics;
pub mod broker;
pub mod deal;
pub mod ledger;
pub mod lot;
pub mod shipment;

pub use analytics::AnalyticsService;
pub use broker::BrokerService;
pub use deal::DealService;
pub use ledger::LedgerService;
pub use lot::LotService;
pub use shipment::ShipmentService;
