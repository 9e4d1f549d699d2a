//! Database models for the AgriMarket Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
