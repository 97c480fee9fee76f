// src/handlers/order.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Local;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, json::AppJson},
    models::kitchen::KitchenEvent,
};

fn default_quantity() -> i32 {
    1
}

// ---
// Payload: PlaceOrder
// ---
#[derive(Debug, Deserialize, Validate)]
pub struct OrderPayload {
    pub store_id: i64,
    pub product_id: i64,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub message: String,
    pub product: String,
}

// ---
// Handler: create_order
// ---
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<OrderPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;

    let receipt = app_state
        .order_service
        .place_order(
            &app_state.db_pool,
            payload.store_id,
            payload.product_id,
            payload.quantity,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n))?;

    // Stock is committed at this point. The kitchen hears about it afterwards
    // and nothing that happens to a display changes the response.
    let report = app_state
        .kitchen_hub
        .broadcast(&KitchenEvent::new_order(&receipt, Local::now()));

    tracing::debug!(
        product = %receipt.product_name,
        displays = report.delivered,
        dropped = report.dropped.len(),
        "kitchen notified"
    );

    Ok((
        StatusCode::OK,
        Json(OrderResponse {
            message: app_state.i18n.get(&locale.0, "order.success"),
            product: receipt.product_name,
        }),
    ))
}
