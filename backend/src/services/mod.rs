//! Business logic services for the AgriMarket Platform

pub mod delivery;
pub mod inventory;
pub mod product;
pub mod warehouse;

pub use delivery::DeliveryService;
pub use inventory::InventoryService;
pub use product::ProductService;
pub use warehouse::WarehouseService;
