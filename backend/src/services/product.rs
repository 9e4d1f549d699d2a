//! Product catalog service
//!
//! Product CRUD. The denormalized `stock_quantity` aggregate is read-only
//! here; only the inventory service recomputes it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Product;
use shared::validation::validate_name;

/// Product service for managing the catalog
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Database row for a product
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    name_th: Option<String>,
    unit: String,
    weight_kg: Option<Decimal>,
    unit_price: Option<Decimal>,
    stock_quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            name_th: row.name_th,
            unit: row.unit,
            weight_kg: row.weight_kg,
            unit_price: row.unit_price,
            stock_quantity: row.stock_quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub name_th: Option<String>,
    pub unit: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub unit_price: Option<Decimal>,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub name_th: Option<String>,
    pub unit: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub unit_price: Option<Decimal>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_name(&input.name).map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_measures(input.weight_kg, input.unit_price)?;

        let unit = input.unit.unwrap_or_else(|| "kg".to_string());

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, name, name_th, unit, weight_kg, unit_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, name_th, unit, weight_kg, unit_price, stock_quantity, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.name_th)
        .bind(&unit)
        .bind(input.weight_kg)
        .bind(input.unit_price)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a product by ID
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, name_th, unit, weight_kg, unit_price, stock_quantity, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// List all products
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, name_th, unit, weight_kg, unit_price, stock_quantity, created_at, updated_at
            FROM products
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Update a product (partial; aggregate stock is not settable here)
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        if let Some(name) = &input.name {
            validate_name(name).map_err(|e| AppError::ValidationError(e.to_string()))?;
        }
        validate_measures(input.weight_kg, input.unit_price)?;

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = COALESCE($1, name), name_th = COALESCE($2, name_th),
                unit = COALESCE($3, unit), weight_kg = COALESCE($4, weight_kg),
                unit_price = COALESCE($5, unit_price), updated_at = NOW()
            WHERE id = $6
            RETURNING id, name, name_th, unit, weight_kg, unit_price, stock_quantity, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.name_th)
        .bind(&input.unit)
        .bind(input.weight_kg)
        .bind(input.unit_price)
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }
}

/// Weight and price must be non-negative when present
fn validate_measures(weight_kg: Option<Decimal>, unit_price: Option<Decimal>) -> AppResult<()> {
    if let Some(weight) = weight_kg {
        if weight < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "weight_kg".to_string(),
                message: "Weight cannot be negative".to_string(),
                message_th: "น้ำหนักต้องไม่ติดลบ".to_string(),
            });
        }
    }
    if let Some(price) = unit_price {
        if price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "unit_price".to_string(),
                message: "Price cannot be negative".to_string(),
                message_th: "ราคาต้องไม่ติดลบ".to_string(),
            });
        }
    }
    Ok(())
}
