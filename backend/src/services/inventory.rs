//! Inventory service: stock movements, inventory records, and the ledger
//!
//! All four movement operations (stock in, stock out, adjust, move) execute
//! as a single database transaction: inventory mutations, product aggregate
//! recomputation, and ledger writes either all commit or none do. Touched
//! inventory rows are read `FOR UPDATE` and decrements carry a
//! `stock_quantity >= n` guard, so concurrent movements against the same
//! record cannot overdraw it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    AdjustItem, InventoryRecord, MovementItem, RelatedDocument, StockTransaction,
    StockTransactionItem, TransactionType, DEFAULT_REORDER_LEVEL,
};
use shared::types::{PaginatedResponse, PaginationMeta};
use shared::validation::{validate_adjust_items, validate_movement_items};

/// Inventory service for stock movements and ledger queries
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Database row for an inventory record
#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    id: Uuid,
    warehouse_id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    stock_quantity: i32,
    reorder_level: i32,
    last_updated: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        InventoryRecord {
            id: row.id,
            warehouse_id: row.warehouse_id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            stock_quantity: row.stock_quantity,
            reorder_level: row.reorder_level,
            last_updated: row.last_updated,
        }
    }
}

/// Database row for a ledger entry (items loaded separately)
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    transaction_type: String,
    warehouse_id: Uuid,
    performed_by: Option<String>,
    notes: Option<String>,
    notes_th: Option<String>,
    related_transaction_type: Option<String>,
    related_transaction_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

/// Database row for a ledger entry item
#[derive(Debug, sqlx::FromRow)]
struct TransactionItemRow {
    transaction_id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    quantity: i32,
    unit: String,
    unit_price: Option<Decimal>,
}

/// Input for a stock-in batch
#[derive(Debug, Deserialize)]
pub struct StockInInput {
    pub warehouse_id: Uuid,
    pub products: Vec<MovementItem>,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    /// Purchase that caused this stock-in; linked bidirectionally
    pub purchase_id: Option<Uuid>,
}

/// Input for a stock-out batch
#[derive(Debug, Deserialize)]
pub struct StockOutInput {
    pub warehouse_id: Uuid,
    pub products: Vec<MovementItem>,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    /// Sales transaction that caused this stock-out; linked bidirectionally
    pub sales_transaction_id: Option<Uuid>,
}

/// Input for an adjust batch (absolute target quantities)
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub warehouse_id: Uuid,
    pub products: Vec<AdjustItem>,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
}

/// Input for a warehouse-to-warehouse move
#[derive(Debug, Deserialize)]
pub struct MoveStockInput {
    pub source_warehouse_id: Uuid,
    pub destination_warehouse_id: Uuid,
    pub products: Vec<MovementItem>,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
}

/// The two cross-referenced ledger entries of a move
#[derive(Debug, Serialize)]
pub struct MoveStockResult {
    pub outgoing: StockTransaction,
    pub incoming: StockTransaction,
}

/// Ledger query filter
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    pub warehouse_id: Option<Uuid>,
    pub transaction_type: Option<TransactionType>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a stock-in: increment (or create) inventory records, recompute
    /// product aggregates, and append one ledger entry for the whole batch.
    pub async fn stock_in(&self, input: StockInInput) -> AppResult<StockTransaction> {
        validate_movement_items(&input.products)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let mut tx = self.db.begin().await?;

        ensure_warehouse(&mut tx, input.warehouse_id, "Warehouse").await?;
        ensure_products(&mut tx, &input.products).await?;

        let related = match input.purchase_id {
            Some(purchase_id) => {
                ensure_purchase(&mut tx, purchase_id).await?;
                Some(RelatedDocument::Purchase(purchase_id))
            }
            None => None,
        };

        for item in &input.products {
            add_stock(
                &mut tx,
                input.warehouse_id,
                item.product_id,
                item.variant_id,
                item.quantity,
            )
            .await?;
        }

        for product_id in distinct_product_ids(&input.products) {
            recompute_product_stock(&mut tx, product_id).await?;
        }

        let items = ledger_items(&input.products);
        let transaction = append_ledger_entry(
            &mut tx,
            TransactionType::StockIn,
            input.warehouse_id,
            &items,
            &input.performed_by,
            &input.notes,
            &input.notes_th,
            related,
        )
        .await?;

        // Back-link the purchase to the ledger entry it produced
        if let Some(purchase_id) = input.purchase_id {
            sqlx::query("UPDATE purchases SET stock_transaction_id = $1 WHERE id = $2")
                .bind(transaction.id)
                .bind(purchase_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(transaction)
    }

    /// Record a stock-out: every item must have sufficient stock or the
    /// whole batch aborts with no partial writes.
    pub async fn stock_out(&self, input: StockOutInput) -> AppResult<StockTransaction> {
        validate_movement_items(&input.products)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let mut tx = self.db.begin().await?;

        ensure_warehouse(&mut tx, input.warehouse_id, "Warehouse").await?;
        ensure_products(&mut tx, &input.products).await?;

        let related = match input.sales_transaction_id {
            Some(sale_id) => {
                ensure_sales_transaction(&mut tx, sale_id).await?;
                Some(RelatedDocument::SalesTransaction(sale_id))
            }
            None => None,
        };

        for item in &input.products {
            remove_stock(
                &mut tx,
                input.warehouse_id,
                item.product_id,
                item.variant_id,
                item.quantity,
            )
            .await?;
        }

        for product_id in distinct_product_ids(&input.products) {
            recompute_product_stock(&mut tx, product_id).await?;
        }

        let items = ledger_items(&input.products);
        let transaction = append_ledger_entry(
            &mut tx,
            TransactionType::StockOut,
            input.warehouse_id,
            &items,
            &input.performed_by,
            &input.notes,
            &input.notes_th,
            related,
        )
        .await?;

        if let Some(sale_id) = input.sales_transaction_id {
            sqlx::query("UPDATE sales_transactions SET stock_transaction_id = $1 WHERE id = $2")
                .bind(transaction.id)
                .bind(sale_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(transaction)
    }

    /// Settle inventory records on absolute quantities.
    ///
    /// Unlike stock in/out, adjust writes one ledger entry per item with a
    /// non-zero delta (typed stock_in or stock_out by the delta's sign);
    /// items already at their target are skipped entirely.
    pub async fn adjust_stock(&self, input: AdjustStockInput) -> AppResult<Vec<StockTransaction>> {
        validate_adjust_items(&input.products)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let mut tx = self.db.begin().await?;

        ensure_warehouse(&mut tx, input.warehouse_id, "Warehouse").await?;
        ensure_adjust_products(&mut tx, &input.products).await?;

        let mut transactions = Vec::new();

        for item in &input.products {
            let (record_id, current) = match locked_record(
                &mut tx,
                input.warehouse_id,
                item.product_id,
                item.variant_id,
            )
            .await?
            {
                Some(found) => found,
                None => {
                    let id = create_empty_record(
                        &mut tx,
                        input.warehouse_id,
                        item.product_id,
                        item.variant_id,
                    )
                    .await?;
                    (id, 0)
                }
            };

            let delta = item.new_quantity - current;
            if delta == 0 {
                continue;
            }

            sqlx::query(
                "UPDATE inventory_records SET stock_quantity = $1, last_updated = NOW() WHERE id = $2",
            )
            .bind(item.new_quantity)
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

            recompute_product_stock(&mut tx, item.product_id).await?;

            let transaction_type = if delta > 0 {
                TransactionType::StockIn
            } else {
                TransactionType::StockOut
            };
            let items = vec![StockTransactionItem {
                product_id: item.product_id,
                variant_id: item.variant_id,
                quantity: delta.abs(),
                unit: item.unit.clone().unwrap_or_else(|| "kg".to_string()),
                unit_price: None,
            }];

            let transaction = append_ledger_entry(
                &mut tx,
                transaction_type,
                input.warehouse_id,
                &items,
                &input.performed_by,
                &input.notes,
                &input.notes_th,
                None,
            )
            .await?;
            transactions.push(transaction);
        }

        tx.commit().await?;

        Ok(transactions)
    }

    /// Move stock between two warehouses, producing an outgoing and an
    /// incoming ledger entry that cross-reference each other.
    pub async fn move_stock(&self, input: MoveStockInput) -> AppResult<MoveStockResult> {
        if input.source_warehouse_id == input.destination_warehouse_id {
            return Err(AppError::Validation {
                field: "destination_warehouse_id".to_string(),
                message: "Source and destination warehouses must be different".to_string(),
                message_th: "คลังสินค้าต้นทางและปลายทางต้องแตกต่างกัน".to_string(),
            });
        }
        validate_movement_items(&input.products)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let mut tx = self.db.begin().await?;

        ensure_warehouse(&mut tx, input.source_warehouse_id, "Source warehouse").await?;
        ensure_warehouse(
            &mut tx,
            input.destination_warehouse_id,
            "Destination warehouse",
        )
        .await?;
        ensure_products(&mut tx, &input.products).await?;

        for item in &input.products {
            remove_stock(
                &mut tx,
                input.source_warehouse_id,
                item.product_id,
                item.variant_id,
                item.quantity,
            )
            .await?;
            add_stock(
                &mut tx,
                input.destination_warehouse_id,
                item.product_id,
                item.variant_id,
                item.quantity,
            )
            .await?;
        }

        for product_id in distinct_product_ids(&input.products) {
            recompute_product_stock(&mut tx, product_id).await?;
        }

        let items = ledger_items(&input.products);
        let outgoing = append_ledger_entry(
            &mut tx,
            TransactionType::MoveStock,
            input.source_warehouse_id,
            &items,
            &input.performed_by,
            &input.notes,
            &input.notes_th,
            None,
        )
        .await?;
        let incoming = append_ledger_entry(
            &mut tx,
            TransactionType::MoveStock,
            input.destination_warehouse_id,
            &items,
            &input.performed_by,
            &input.notes,
            &input.notes_th,
            Some(RelatedDocument::StockTransaction(outgoing.id)),
        )
        .await?;

        // Attach the pair reference on the outgoing entry: the single
        // permitted mutation of a ledger row
        sqlx::query(
            "UPDATE stock_transactions SET related_transaction_type = $1, related_transaction_id = $2 WHERE id = $3",
        )
        .bind(RelatedDocument::StockTransaction(incoming.id).type_tag())
        .bind(incoming.id)
        .bind(outgoing.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let outgoing = StockTransaction {
            related: Some(RelatedDocument::StockTransaction(incoming.id)),
            ..outgoing
        };

        Ok(MoveStockResult { outgoing, incoming })
    }

    /// Get one inventory record
    pub async fn get_inventory(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
        variant_id: Option<Uuid>,
    ) -> AppResult<InventoryRecord> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT id, warehouse_id, product_id, variant_id, stock_quantity, reorder_level, last_updated
            FROM inventory_records
            WHERE warehouse_id = $1 AND product_id = $2 AND variant_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(warehouse_id)
        .bind(product_id)
        .bind(variant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory record".to_string()))?;

        Ok(row.into())
    }

    /// List inventory records for a warehouse
    pub async fn list_inventory(&self, warehouse_id: Uuid) -> AppResult<Vec<InventoryRecord>> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT id, warehouse_id, product_id, variant_id, stock_quantity, reorder_level, last_updated
            FROM inventory_records
            WHERE warehouse_id = $1
            ORDER BY last_updated DESC
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// List records at or below their reorder threshold.
    ///
    /// The read API a replenishment batch job consumes; this service never
    /// acts on the threshold itself.
    pub async fn list_low_stock(&self) -> AppResult<Vec<InventoryRecord>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT id, warehouse_id, product_id, variant_id, stock_quantity, reorder_level, last_updated
            FROM inventory_records
            WHERE stock_quantity <= reorder_level
            ORDER BY stock_quantity ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// List ledger entries, newest first, optionally filtered by warehouse
    /// and transaction type
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> AppResult<PaginatedResponse<StockTransaction>> {
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.per_page.unwrap_or(20).clamp(1, 100);

        let total_items: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM stock_transactions
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::text IS NULL OR transaction_type = $2)
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(filter.transaction_type.map(|t| t.as_str()))
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, transaction_type, warehouse_id, performed_by, notes, notes_th,
                   related_transaction_type, related_transaction_id, created_at
            FROM stock_transactions
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::text IS NULL OR transaction_type = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.warehouse_id)
        .bind(filter.transaction_type.map(|t| t.as_str()))
        .bind(i64::from(per_page))
        .bind((i64::from(page) - 1) * i64::from(per_page))
        .fetch_all(&self.db)
        .await?;

        let data = self.with_items(rows).await?;

        let total_items = total_items.max(0) as u64;
        let total_pages = ((total_items + per_page as u64 - 1) / per_page as u64) as u32;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta {
                page,
                per_page,
                total_items,
                total_pages,
            },
        })
    }

    /// Get one ledger entry with its ordered items
    pub async fn get_transaction(&self, transaction_id: Uuid) -> AppResult<StockTransaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, transaction_type, warehouse_id, performed_by, notes, notes_th,
                   related_transaction_type, related_transaction_id, created_at
            FROM stock_transactions
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock transaction".to_string()))?;

        let mut transactions = self.with_items(vec![row]).await?;
        transactions
            .pop()
            .ok_or_else(|| AppError::Internal("Transaction vanished while loading items".to_string()))
    }

    /// List ledger entries containing a product, newest first
    pub async fn list_transactions_by_product(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<StockTransaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT DISTINCT t.id, t.transaction_type, t.warehouse_id, t.performed_by, t.notes, t.notes_th,
                   t.related_transaction_type, t.related_transaction_id, t.created_at
            FROM stock_transactions t
            JOIN stock_transaction_items i ON i.transaction_id = t.id
            WHERE i.product_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        self.with_items(rows).await
    }

    /// Resolve item lists for a batch of ledger rows
    async fn with_items(&self, rows: Vec<TransactionRow>) -> AppResult<Vec<StockTransaction>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let item_rows = sqlx::query_as::<_, TransactionItemRow>(
            r#"
            SELECT transaction_id, product_id, variant_id, quantity, unit, unit_price
            FROM stock_transaction_items
            WHERE transaction_id = ANY($1)
            ORDER BY transaction_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut items: HashMap<Uuid, Vec<StockTransactionItem>> = HashMap::new();
        for item in item_rows {
            items
                .entry(item.transaction_id)
                .or_default()
                .push(StockTransactionItem {
                    product_id: item.product_id,
                    variant_id: item.variant_id,
                    quantity: item.quantity,
                    unit: item.unit,
                    unit_price: item.unit_price,
                });
        }

        rows.into_iter()
            .map(|row| {
                let entry_items = items.remove(&row.id).unwrap_or_default();
                transaction_from_row(row, entry_items)
            })
            .collect()
    }
}

/// Convert a ledger row and its items into the domain model
fn transaction_from_row(
    row: TransactionRow,
    items: Vec<StockTransactionItem>,
) -> AppResult<StockTransaction> {
    let transaction_type = TransactionType::parse(&row.transaction_type).ok_or_else(|| {
        AppError::Internal(format!("Unknown transaction type: {}", row.transaction_type))
    })?;
    let related = match (row.related_transaction_type.as_deref(), row.related_transaction_id) {
        (Some(tag), Some(id)) => RelatedDocument::from_parts(tag, id),
        _ => None,
    };

    Ok(StockTransaction {
        id: row.id,
        transaction_type,
        warehouse_id: row.warehouse_id,
        items,
        performed_by: row.performed_by,
        notes: row.notes,
        notes_th: row.notes_th,
        related,
        created_at: row.created_at,
    })
}

/// Ledger item list for a movement batch, preserving item order
fn ledger_items(products: &[MovementItem]) -> Vec<StockTransactionItem> {
    products
        .iter()
        .map(|p| StockTransactionItem {
            product_id: p.product_id,
            variant_id: p.variant_id,
            quantity: p.quantity,
            unit: p.unit.clone().unwrap_or_else(|| "kg".to_string()),
            unit_price: p.unit_price,
        })
        .collect()
}

/// Distinct product ids of a batch, in first-seen order
fn distinct_product_ids(products: &[MovementItem]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    products
        .iter()
        .map(|p| p.product_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

async fn ensure_warehouse(
    conn: &mut PgConnection,
    warehouse_id: Uuid,
    resource: &str,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
    )
    .bind(warehouse_id)
    .fetch_one(&mut *conn)
    .await?;

    if !exists {
        return Err(AppError::NotFound(resource.to_string()));
    }
    Ok(())
}

async fn ensure_products(conn: &mut PgConnection, products: &[MovementItem]) -> AppResult<()> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.product_id).collect();
    ensure_product_ids(conn, &ids).await
}

async fn ensure_adjust_products(conn: &mut PgConnection, products: &[AdjustItem]) -> AppResult<()> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.product_id).collect();
    ensure_product_ids(conn, &ids).await
}

async fn ensure_product_ids(conn: &mut PgConnection, ids: &[Uuid]) -> AppResult<()> {
    let existing: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;
    let existing: HashSet<Uuid> = existing.into_iter().collect();

    if let Some(missing) = ids.iter().find(|id| !existing.contains(id)) {
        return Err(AppError::NotFound(format!("Product {}", missing)));
    }
    Ok(())
}

async fn ensure_purchase(conn: &mut PgConnection, purchase_id: Uuid) -> AppResult<()> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM purchases WHERE id = $1)")
            .bind(purchase_id)
            .fetch_one(&mut *conn)
            .await?;

    if !exists {
        return Err(AppError::NotFound(format!("Purchase {}", purchase_id)));
    }
    Ok(())
}

async fn ensure_sales_transaction(conn: &mut PgConnection, sale_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM sales_transactions WHERE id = $1)",
    )
    .bind(sale_id)
    .fetch_one(&mut *conn)
    .await?;

    if !exists {
        return Err(AppError::NotFound(format!("Sales transaction {}", sale_id)));
    }
    Ok(())
}

/// Lock the inventory row for one (warehouse, product, variant) pair and
/// return its id and current quantity
async fn locked_record(
    conn: &mut PgConnection,
    warehouse_id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
) -> AppResult<Option<(Uuid, i32)>> {
    let row = sqlx::query_as::<_, (Uuid, i32)>(
        r#"
        SELECT id, stock_quantity
        FROM inventory_records
        WHERE warehouse_id = $1 AND product_id = $2 AND variant_id IS NOT DISTINCT FROM $3
        FOR UPDATE
        "#,
    )
    .bind(warehouse_id)
    .bind(product_id)
    .bind(variant_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Create an inventory record with zero stock and the default reorder level
async fn create_empty_record(
    conn: &mut PgConnection,
    warehouse_id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
) -> AppResult<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO inventory_records (id, warehouse_id, product_id, variant_id, stock_quantity, reorder_level, last_updated)
        VALUES ($1, $2, $3, $4, 0, $5, NOW())
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(warehouse_id)
    .bind(product_id)
    .bind(variant_id)
    .bind(DEFAULT_REORDER_LEVEL)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Increment (or create) an inventory record
async fn add_stock(
    conn: &mut PgConnection,
    warehouse_id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    quantity: i32,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_records (id, warehouse_id, product_id, variant_id, stock_quantity, reorder_level, last_updated)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        ON CONFLICT (warehouse_id, product_id, variant_id)
        DO UPDATE SET stock_quantity = inventory_records.stock_quantity + EXCLUDED.stock_quantity,
                      last_updated = NOW()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(warehouse_id)
    .bind(product_id)
    .bind(variant_id)
    .bind(quantity)
    .bind(DEFAULT_REORDER_LEVEL)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Decrement an inventory record, failing the batch when stock is short.
///
/// The row is locked first so the reported available quantity is exact; the
/// update still guards on `stock_quantity >= quantity` so the counter can
/// never go negative.
async fn remove_stock(
    conn: &mut PgConnection,
    warehouse_id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    quantity: i32,
) -> AppResult<()> {
    let (record_id, available) = match locked_record(conn, warehouse_id, product_id, variant_id)
        .await?
    {
        Some(found) => found,
        None => {
            return Err(AppError::InsufficientStock {
                product_id,
                available: 0,
                requested: quantity,
            })
        }
    };

    if available < quantity {
        return Err(AppError::InsufficientStock {
            product_id,
            available,
            requested: quantity,
        });
    }

    let result = sqlx::query(
        r#"
        UPDATE inventory_records
        SET stock_quantity = stock_quantity - $1, last_updated = NOW()
        WHERE id = $2 AND stock_quantity >= $1
        "#,
    )
    .bind(quantity)
    .bind(record_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InsufficientStock {
            product_id,
            available,
            requested: quantity,
        });
    }

    Ok(())
}

/// Recompute a product's denormalized aggregate stock from its records
async fn recompute_product_stock(conn: &mut PgConnection, product_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = (
            SELECT COALESCE(SUM(stock_quantity), 0)
            FROM inventory_records
            WHERE product_id = $1
        ), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Append one ledger entry with its items
#[allow(clippy::too_many_arguments)]
async fn append_ledger_entry(
    conn: &mut PgConnection,
    transaction_type: TransactionType,
    warehouse_id: Uuid,
    items: &[StockTransactionItem],
    performed_by: &Option<String>,
    notes: &Option<String>,
    notes_th: &Option<String>,
    related: Option<RelatedDocument>,
) -> AppResult<StockTransaction> {
    let row = sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO stock_transactions (id, transaction_type, warehouse_id, performed_by, notes, notes_th,
                                        related_transaction_type, related_transaction_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, transaction_type, warehouse_id, performed_by, notes, notes_th,
                  related_transaction_type, related_transaction_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(transaction_type.as_str())
    .bind(warehouse_id)
    .bind(performed_by)
    .bind(notes)
    .bind(notes_th)
    .bind(related.map(|r| r.type_tag()))
    .bind(related.map(|r| r.id()))
    .fetch_one(&mut *conn)
    .await?;

    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO stock_transaction_items (id, transaction_id, position, product_id, variant_id, quantity, unit, unit_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.id)
        .bind(position as i32)
        .bind(item.product_id)
        .bind(item.variant_id)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.unit_price)
        .execute(&mut *conn)
        .await?;
    }

    transaction_from_row(row, items.to_vec())
}
