//! HTTP handlers for delivery estimation endpoints

use axum::{extract::State, Json};

use crate::error::{AppError, AppResult};
use crate::services::delivery::{DeliveryEstimate, DeliveryEstimateInput, DeliveryService};
use crate::AppState;

/// Estimate delivery from the nearest candidate warehouse with stock.
///
/// The no-stock outcome is a plain 404, distinct from unknown-resource
/// failures inside the estimator.
pub async fn estimate_delivery(
    State(state): State<AppState>,
    Json(input): Json<DeliveryEstimateInput>,
) -> AppResult<Json<DeliveryEstimate>> {
    let service = DeliveryService::new(state.db);
    let estimate = service
        .estimate_delivery(input)
        .await?
        .ok_or(AppError::NoStockAvailable)?;
    Ok(Json(estimate))
}
