//! HTTP handlers for inventory and stock-movement endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::inventory::{
    AdjustStockInput, InventoryService, MoveStockInput, MoveStockResult, StockInInput,
    StockOutInput, TransactionFilter,
};
use crate::models::{InventoryRecord, StockTransaction};
use crate::AppState;
use shared::types::PaginatedResponse;

/// Record a stock-in batch
pub async fn stock_in(
    State(state): State<AppState>,
    Json(input): Json<StockInInput>,
) -> AppResult<(StatusCode, Json<StockTransaction>)> {
    let service = InventoryService::new(state.db);
    let transaction = service.stock_in(input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Record a stock-out batch
pub async fn stock_out(
    State(state): State<AppState>,
    Json(input): Json<StockOutInput>,
) -> AppResult<Json<StockTransaction>> {
    let service = InventoryService::new(state.db);
    let transaction = service.stock_out(input).await?;
    Ok(Json(transaction))
}

/// Settle inventory records on absolute quantities
pub async fn adjust_stock(
    State(state): State<AppState>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let service = InventoryService::new(state.db);
    let transactions = service.adjust_stock(input).await?;
    Ok(Json(transactions))
}

/// Move stock between warehouses
pub async fn move_stock(
    State(state): State<AppState>,
    Json(input): Json<MoveStockInput>,
) -> AppResult<Json<MoveStockResult>> {
    let service = InventoryService::new(state.db);
    let result = service.move_stock(input).await?;
    Ok(Json(result))
}

/// List inventory records for a warehouse
pub async fn list_warehouse_inventory(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<InventoryRecord>>> {
    let service = InventoryService::new(state.db);
    let records = service.list_inventory(warehouse_id).await?;
    Ok(Json(records))
}

/// Variant selector for inventory record lookups
#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub variant_id: Option<Uuid>,
}

/// Get one inventory record
pub async fn get_inventory_record(
    State(state): State<AppState>,
    Path((warehouse_id, product_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<VariantQuery>,
) -> AppResult<Json<InventoryRecord>> {
    let service = InventoryService::new(state.db);
    let record = service
        .get_inventory(warehouse_id, product_id, query.variant_id)
        .await?;
    Ok(Json(record))
}

/// List records at or below their reorder threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InventoryRecord>>> {
    let service = InventoryService::new(state.db);
    let records = service.list_low_stock().await?;
    Ok(Json(records))
}

/// List ledger entries, paginated, optionally filtered by warehouse and type
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
) -> AppResult<Json<PaginatedResponse<StockTransaction>>> {
    let service = InventoryService::new(state.db);
    let transactions = service.list_transactions(filter).await?;
    Ok(Json(transactions))
}

/// Get one ledger entry with its items
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<StockTransaction>> {
    let service = InventoryService::new(state.db);
    let transaction = service.get_transaction(transaction_id).await?;
    Ok(Json(transaction))
}

/// List ledger entries containing a product
pub async fn get_product_transactions(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let service = InventoryService::new(state.db);
    let transactions = service.list_transactions_by_product(product_id).await?;
    Ok(Json(transactions))
}
