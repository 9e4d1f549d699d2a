//! Validation utilities for the AgriMarket Platform
//!
//! Pure validation rules for stock movements and warehouse data; services
//! translate failures into bilingual API errors.

use crate::models::{AdjustItem, MovementItem};

// ============================================================================
// Stock Movement Validations
// ============================================================================

/// Validate a stock-in / stock-out / move item batch
pub fn validate_movement_items(items: &[MovementItem]) -> Result<(), &'static str> {
    if items.is_empty() {
        return Err("At least one item is required");
    }
    for item in items {
        if item.quantity <= 0 {
            return Err("Quantity must be positive");
        }
    }
    Ok(())
}

/// Validate an adjust batch: targets are absolute, so zero is allowed
pub fn validate_adjust_items(items: &[AdjustItem]) -> Result<(), &'static str> {
    if items.is_empty() {
        return Err("At least one item is required");
    }
    for item in items {
        if item.new_quantity < 0 {
            return Err("New quantity cannot be negative");
        }
    }
    Ok(())
}

// ============================================================================
// Warehouse Validations
// ============================================================================

/// Validate a human-facing name field
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    Ok(())
}

/// Validate geodetic coordinates in WGS84 degrees
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), &'static str> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn item(quantity: i32) -> MovementItem {
        MovementItem {
            product_id: Uuid::new_v4(),
            variant_id: None,
            quantity,
            unit: None,
            unit_price: None,
        }
    }

    fn adjust(new_quantity: i32) -> AdjustItem {
        AdjustItem {
            product_id: Uuid::new_v4(),
            variant_id: None,
            new_quantity,
            unit: None,
        }
    }

    #[test]
    fn test_validate_movement_items_valid() {
        assert!(validate_movement_items(&[item(1), item(50)]).is_ok());
    }

    #[test]
    fn test_validate_movement_items_empty() {
        assert!(validate_movement_items(&[]).is_err());
    }

    #[test]
    fn test_validate_movement_items_zero_quantity() {
        assert!(validate_movement_items(&[item(5), item(0)]).is_err());
    }

    #[test]
    fn test_validate_movement_items_negative_quantity() {
        assert!(validate_movement_items(&[item(-3)]).is_err());
    }

    #[test]
    fn test_validate_adjust_items_zero_target_allowed() {
        assert!(validate_adjust_items(&[adjust(0)]).is_ok());
    }

    #[test]
    fn test_validate_adjust_items_negative_target() {
        assert!(validate_adjust_items(&[adjust(-1)]).is_err());
    }

    #[test]
    fn test_validate_adjust_items_empty() {
        assert!(validate_adjust_items(&[]).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Khon Kaen Depot").is_ok());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(17.0, 78.0).is_ok());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
    }
}
