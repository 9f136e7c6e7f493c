//! Shared types and models for the Sauda Management Platform
//!
//! This crate contains the domain documents and the pure business rules
//! (bora-count bookkeeping, nett-amount costing, shipment progress
//! predicates) shared between the backend and other components.

pub mod costing;
pub mod models;
pub mod types;
pub mod validation;

pub use costing::*;
pub use models::*;
pub use types::*;
pub use validation::*;
