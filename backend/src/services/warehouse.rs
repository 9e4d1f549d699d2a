//! Warehouse management service
//!
//! Warehouse CRUD (soft archive) and the adaptive area-of-interest
//! selection used to build warehouse shortlists around a user location.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Warehouse;
use shared::geo::nearest_cluster;
use shared::types::GeoPoint;
use shared::validation::{validate_coordinates, validate_name};

/// Warehouse service for managing fulfillment warehouses
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Database row for a warehouse
#[derive(Debug, sqlx::FromRow)]
struct WarehouseRow {
    id: Uuid,
    name: String,
    name_th: Option<String>,
    address: Option<String>,
    latitude: f64,
    longitude: f64,
    archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WarehouseRow> for Warehouse {
    fn from(row: WarehouseRow) -> Self {
        Warehouse {
            id: row.id,
            name: row.name,
            name_th: row.name_th,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            archived: row.archived,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseInput {
    pub name: String,
    pub name_th: Option<String>,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Input for updating a warehouse
#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub name_th: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a warehouse
    pub async fn create_warehouse(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        validate_name(&input.name).map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_coordinates(input.latitude, input.longitude)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            INSERT INTO warehouses (id, name, name_th, address, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, name_th, address, latitude, longitude, archived, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.name_th)
        .bind(&input.address)
        .bind(input.latitude)
        .bind(input.longitude)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a warehouse by ID
    pub async fn get_warehouse(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            SELECT id, name, name_th, address, latitude, longitude, archived, created_at, updated_at
            FROM warehouses
            WHERE id = $1
            "#,
        )
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        Ok(row.into())
    }

    /// List warehouses, excluding archived ones unless asked for
    pub async fn list_warehouses(&self, include_archived: bool) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            r#"
            SELECT id, name, name_th, address, latitude, longitude, archived, created_at, updated_at
            FROM warehouses
            WHERE $1 OR archived = false
            ORDER BY name ASC
            "#,
        )
        .bind(include_archived)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Update a warehouse (partial)
    pub async fn update_warehouse(
        &self,
        warehouse_id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        let existing = self.get_warehouse(warehouse_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let latitude = input.latitude.unwrap_or(existing.latitude);
        let longitude = input.longitude.unwrap_or(existing.longitude);

        validate_name(&name).map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_coordinates(latitude, longitude)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            UPDATE warehouses
            SET name = $1, name_th = COALESCE($2, name_th), address = COALESCE($3, address),
                latitude = $4, longitude = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING id, name, name_th, address, latitude, longitude, archived, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&input.name_th)
        .bind(&input.address)
        .bind(latitude)
        .bind(longitude)
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Archive a warehouse (soft delete)
    pub async fn archive_warehouse(&self, warehouse_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE warehouses SET archived = true, updated_at = NOW() WHERE id = $1")
                .bind(warehouse_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        Ok(())
    }

    /// Select the area of interest around a user location: the adaptively
    /// sized cluster of nearest non-archived warehouses.
    ///
    /// Returned nearest first; empty when no warehouses exist.
    pub async fn select_area_of_interest(&self, user: GeoPoint) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            r#"
            SELECT id, name, name_th, address, latitude, longitude, archived, created_at, updated_at
            FROM warehouses
            WHERE archived = false
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let warehouses: Vec<Warehouse> = rows.into_iter().map(|r| r.into()).collect();
        let points: Vec<GeoPoint> = warehouses.iter().map(|w| w.location()).collect();

        let selected = nearest_cluster(user, &points);

        let mut by_index: Vec<Option<Warehouse>> = warehouses.into_iter().map(Some).collect();
        let mut result = Vec::with_capacity(selected.len());
        for index in selected {
            if let Some(warehouse) = by_index[index].take() {
                result.push(warehouse);
            }
        }

        Ok(result)
    }
}
