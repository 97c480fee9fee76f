// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, json::AppJson},
};

// ---
// Custom validation
// ---
// Stock columns are NUMERIC(14, 3).
const QUANTITY_SCALE: u32 = 3;
const QUANTITY_LIMIT: i64 = 100_000_000_000;

fn validate_restock_quantity(val: &Decimal) -> Result<(), ValidationError> {
    let message = if *val <= Decimal::ZERO {
        "Quantity must be greater than zero."
    } else if val.normalize().scale() > QUANTITY_SCALE {
        "Quantity allows at most 3 decimal places."
    } else if *val >= Decimal::from(QUANTITY_LIMIT) {
        "Quantity is too large."
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    Err(err)
}

// ---
// Payload: Restock
// ---
#[derive(Debug, Deserialize, Validate)]
pub struct RestockPayload {
    pub store_id: i64,
    pub ingredient_id: i64,

    #[validate(custom(function = "validate_restock_quantity"))]
    pub quantity: Decimal,
}

// ---
// Handler: restock
// ---
pub async fn restock(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<RestockPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;

    let row = app_state
        .inventory_service
        .restock(
            &app_state.db_pool,
            payload.store_id,
            payload.ingredient_id,
            payload.quantity,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n))?;

    // The new balance, so the admin screen can refresh in place.
    Ok((StatusCode::OK, Json(row)))
}

// ---
// Handler: list_store_inventory
// ---
pub async fn list_store_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(store_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let rows = app_state
        .inventory_service
        .list_store_inventory(&app_state.db_pool, store_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(rows)))
}
