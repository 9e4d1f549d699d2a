//! Inventory and stock-ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default reorder threshold for newly created inventory records
pub const DEFAULT_REORDER_LEVEL: i32 = 10;

/// Stock of one product (optionally one variant) at one warehouse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    /// Whether this record is at or below its reorder threshold
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }
}

/// Kinds of stock movement recorded in the ledger
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    StockIn,
    StockOut,
    Adjust,
    MoveStock,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::StockIn => "stock_in",
            TransactionType::StockOut => "stock_out",
            TransactionType::Adjust => "adjust",
            TransactionType::MoveStock => "move_stock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stock_in" => Some(TransactionType::StockIn),
            "stock_out" => Some(TransactionType::StockOut),
            "adjust" => Some(TransactionType::Adjust),
            "move_stock" => Some(TransactionType::MoveStock),
            _ => None,
        }
    }
}

/// Document a ledger entry was caused by or paired with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RelatedDocument {
    Purchase(Uuid),
    SalesTransaction(Uuid),
    StockTransaction(Uuid),
}

impl RelatedDocument {
    pub fn type_tag(&self) -> &'static str {
        match self {
            RelatedDocument::Purchase(_) => "purchase",
            RelatedDocument::SalesTransaction(_) => "sales_transaction",
            RelatedDocument::StockTransaction(_) => "stock_transaction",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            RelatedDocument::Purchase(id)
            | RelatedDocument::SalesTransaction(id)
            | RelatedDocument::StockTransaction(id) => *id,
        }
    }

    /// Rebuild from the `(type_tag, id)` column pair
    pub fn from_parts(type_tag: &str, id: Uuid) -> Option<Self> {
        match type_tag {
            "purchase" => Some(RelatedDocument::Purchase(id)),
            "sales_transaction" => Some(RelatedDocument::SalesTransaction(id)),
            "stock_transaction" => Some(RelatedDocument::StockTransaction(id)),
            _ => None,
        }
    }
}

/// One line of a ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransactionItem {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
    pub unit: String,
    pub unit_price: Option<Decimal>,
}

/// Immutable record of one stock movement event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub warehouse_id: Uuid,
    pub items: Vec<StockTransactionItem>,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    pub related: Option<RelatedDocument>,
    pub created_at: DateTime<Utc>,
}

/// One item of a stock-in / stock-out / move batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementItem {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
}

/// One item of an adjust batch: the absolute quantity to settle on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustItem {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub new_quantity: i32,
    pub unit: Option<String>,
}
