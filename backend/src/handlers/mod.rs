//! HTTP handlers for the Sauda Management Platform

pub mod analytics;
pub mod broker;
pub mod deal;
pub mod health;
pub mod ledger;
pub mod lot;
pub mod shipment;

pub use analytics::*;
pub use broker::*;
pub use deal::*;
pub use health::*;
pub use ledger::*;
pub use lot::*;
pub use shipment::*;
