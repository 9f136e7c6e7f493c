//! Domain models for the Sauda Management Platform

pub mod analytics;
pub mod broker;
pub mod lot;
pub mod sauda;
pub mod shipment;

pub use analytics::*;
pub use broker::*;
pub use lot::*;
pub use sauda::*;
pub use shipment::*;
