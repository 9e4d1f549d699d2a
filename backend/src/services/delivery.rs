//! Delivery estimation service
//!
//! Read-only consumer of inventory records and warehouse locations: picks
//! the nearest candidate warehouse holding stock and bands distance and item
//! weight into a delivery-days estimate.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::geo::{delivery_days, haversine_km, nearest_index};
use shared::types::GeoPoint;

/// Delivery estimator over warehouse stock and locations
#[derive(Clone)]
pub struct DeliveryService {
    db: PgPool,
}

/// Input for a delivery estimate
#[derive(Debug, Deserialize)]
pub struct DeliveryEstimateInput {
    pub user_location: GeoPoint,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub warehouse_ids: Vec<Uuid>,
}

/// A delivery estimate from the selected warehouse
#[derive(Debug, Serialize)]
pub struct DeliveryEstimate {
    pub warehouse_id: Uuid,
    pub distance_km: f64,
    pub delivery_days: u32,
}

/// Candidate warehouse holding stock of the requested product
#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    warehouse_id: Uuid,
    latitude: f64,
    longitude: f64,
}

impl DeliveryService {
    /// Create a new DeliveryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Estimate delivery for a product from the nearest candidate warehouse
    /// with stock.
    ///
    /// `Ok(None)` means no candidate holds stock: a normal outcome, not an
    /// error. Ties on distance go to the first candidate encountered.
    pub async fn estimate_delivery(
        &self,
        input: DeliveryEstimateInput,
    ) -> AppResult<Option<DeliveryEstimate>> {
        // Item weight drives the banding; missing weight counts as light
        let weight_kg = sqlx::query_scalar::<_, Option<rust_decimal::Decimal>>(
            "SELECT weight_kg FROM products WHERE id = $1",
        )
        .bind(input.product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", input.product_id)))?;

        let candidates = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT ir.warehouse_id, w.latitude, w.longitude
            FROM inventory_records ir
            JOIN warehouses w ON w.id = ir.warehouse_id
            WHERE ir.product_id = $1
              AND ir.variant_id IS NOT DISTINCT FROM $2
              AND ir.stock_quantity > 0
              AND ir.warehouse_id = ANY($3)
            "#,
        )
        .bind(input.product_id)
        .bind(input.variant_id)
        .bind(&input.warehouse_ids)
        .fetch_all(&self.db)
        .await?;

        let distances: Vec<f64> = candidates
            .iter()
            .map(|c| {
                haversine_km(
                    input.user_location,
                    GeoPoint::new(c.latitude, c.longitude),
                )
            })
            .collect();

        let index = match nearest_index(&distances) {
            Some(index) => index,
            None => return Ok(None),
        };

        let distance_km = distances[index];
        Ok(Some(DeliveryEstimate {
            warehouse_id: candidates[index].warehouse_id,
            distance_km,
            delivery_days: delivery_days(distance_km, weight_kg),
        }))
    }
}
