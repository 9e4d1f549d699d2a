//! Route definitions for the AgriMarket Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Warehouse management
        .nest("/warehouses", warehouse_routes())
        // Product catalog
        .nest("/products", product_routes())
        // Inventory and stock movements
        .nest("/inventory", inventory_routes())
        // Delivery estimation
        .nest("/delivery", delivery_routes())
}

/// Warehouse management routes
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route("/nearby", get(handlers::nearby_warehouses))
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::archive_warehouse),
        )
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
}

/// Inventory and stock movement routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        // Stock movements
        .route("/stock-in", post(handlers::stock_in))
        .route("/stock-out", post(handlers::stock_out))
        .route("/adjust", post(handlers::adjust_stock))
        .route("/move", post(handlers::move_stock))
        // Inventory records
        .route(
            "/warehouses/:warehouse_id",
            get(handlers::list_warehouse_inventory),
        )
        .route(
            "/warehouses/:warehouse_id/products/:product_id",
            get(handlers::get_inventory_record),
        )
        .route("/low-stock", get(handlers::list_low_stock))
        // Ledger
        .route("/transactions", get(handlers::list_transactions))
        .route(
            "/transactions/:transaction_id",
            get(handlers::get_transaction),
        )
        .route(
            "/products/:product_id/transactions",
            get(handlers::get_product_transactions),
        )
}

/// Delivery estimation routes
fn delivery_routes() -> Router<AppState> {
    Router::new().route("/estimate", post(handlers::estimate_delivery))
}
