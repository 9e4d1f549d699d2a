//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product.
///
/// `stock_quantity` is the denormalized sum over all inventory records for
/// this product; only the stock movement engine recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub name_th: Option<String>,
    pub unit: String,
    /// Per-item shipping weight; drives delivery-day banding
    pub weight_kg: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
