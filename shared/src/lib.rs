//! Shared types and models for the AgriMarket Platform
//!
//! This crate contains the domain types, geospatial math, and validation
//! rules shared between the backend and other components of the system.
//! It is deliberately free of I/O dependencies.

pub mod geo;
pub mod models;
pub mod types;
pub mod validation;

pub use geo::*;
pub use models::*;
pub use types::*;
pub use validation::*;
