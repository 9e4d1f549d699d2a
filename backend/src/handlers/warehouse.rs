//! HTTP handlers for warehouse management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::warehouse::{CreateWarehouseInput, UpdateWarehouseInput, WarehouseService};
use crate::models::Warehouse;
use crate::AppState;
use shared::types::GeoPoint;

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.create_warehouse(input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// Get a warehouse by ID
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.get_warehouse(warehouse_id).await?;
    Ok(Json(warehouse))
}

/// Listing options for warehouses
#[derive(Debug, Deserialize)]
pub struct ListWarehousesQuery {
    pub include_archived: Option<bool>,
}

/// List warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
    Query(query): Query<ListWarehousesQuery>,
) -> AppResult<Json<Vec<Warehouse>>> {
    let service = WarehouseService::new(state.db);
    let warehouses = service
        .list_warehouses(query.include_archived.unwrap_or(false))
        .await?;
    Ok(Json(warehouses))
}

/// Update a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.update_warehouse(warehouse_id, input).await?;
    Ok(Json(warehouse))
}

/// Archive a warehouse
pub async fn archive_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = WarehouseService::new(state.db);
    service.archive_warehouse(warehouse_id).await?;
    Ok(Json(()))
}

/// User location for the nearby-warehouses shortlist
#[derive(Debug, Deserialize)]
pub struct NearbyWarehousesQuery {
    pub latitude: f64,
    pub longitude: f64,
}

/// Warehouse shortlist around a user location
#[derive(Debug, Serialize)]
pub struct NearbyWarehousesResponse {
    pub warehouses: Vec<Warehouse>,
    /// `[longitude, latitude]` pairs of the selected warehouses
    pub coordinates: Vec<[f64; 2]>,
}

/// Get the area-of-interest warehouse shortlist around a location
pub async fn nearby_warehouses(
    State(state): State<AppState>,
    Query(query): Query<NearbyWarehousesQuery>,
) -> AppResult<Json<NearbyWarehousesResponse>> {
    let service = WarehouseService::new(state.db);
    let user = GeoPoint::new(query.latitude, query.longitude);
    let warehouses = service.select_area_of_interest(user).await?;
    let coordinates = warehouses
        .iter()
        .map(|w| w.location().as_lng_lat())
        .collect();
    Ok(Json(NearbyWarehousesResponse {
        warehouses,
        coordinates,
    }))
}
