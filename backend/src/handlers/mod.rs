//! HTTP handlers for the AgriMarket Platform

pub mod delivery;
pub mod health;
pub mod inventory;
pub mod product;
pub mod warehouse;

pub use delivery::*;
pub use health::*;
pub use inventory::*;
pub use product::*;
pub use warehouse::*;
