//! Route definitions for the Sauda Management Platform

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Broker management
        .nest("/brokers", broker_routes())
        // Deal management (lots and shipments are nested under deals)
        .nest("/deals", deal_routes())
        // Shipment operations addressed by shipment id alone
        .nest("/shipments", shipment_routes())
}

/// Broker and broker-ledger routes
fn broker_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_brokers).post(handlers::create_broker))
        .route("/:broker_code", get(handlers::get_broker))
        .route(
            "/:broker_code/ledger",
            get(handlers::list_ledger_entries).post(handlers::post_ledger_entry),
        )
}

/// Deal, lot, and nested shipment routes
fn deal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_deals).post(handlers::create_deal))
        .route(
            "/:deal_id",
            get(handlers::get_deal).delete(handlers::delete_deal),
        )
        .route("/:deal_id/status", put(handlers::update_deal_status))
        .route("/:deal_id/analytics", get(handlers::get_deal_analytics))
        .route("/:deal_id/analytics/lots", get(handlers::get_lot_progress))
        .route("/:deal_id/cost-estimate", post(handlers::post_cost_estimate))
        // Lots
        .route("/:deal_id/lots", get(handlers::list_lots))
        .route("/:deal_id/lots/batch", patch(handlers::update_lots_batch))
        .route(
            "/:deal_id/lots/:lot_id",
            get(handlers::get_lot).patch(handlers::update_lot),
        )
        // Shipments scoped to a deal or lot
        .route(
            "/:deal_id/shipments",
            get(handlers::list_shipments_for_deal),
        )
        .route(
            "/:deal_id/shipments/batch",
            post(handlers::create_shipments_batch),
        )
        .route(
            "/:deal_id/lots/:lot_id/shipments",
            get(handlers::list_shipments_for_lot).post(handlers::create_shipment),
        )
        .route(
            "/:deal_id/lots/:lot_id/shipments/:shipment_id",
            delete(handlers::delete_shipment),
        )
}

/// Shipment routes addressed by shipment id alone
fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/batch", patch(handlers::update_shipments_batch))
        .route(
            "/:shipment_id",
            get(handlers::get_shipment).patch(handlers::update_shipment),
        )
}
