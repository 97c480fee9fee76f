// src/models/inventory.rs

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

// --- Stock row ---
// One per (store, ingredient). `stock_quantity` never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoreInventory {
    pub id: i64,
    pub store_id: i64,
    pub ingredient_id: i64,
    pub stock_quantity: Decimal,
    pub updated_at: DateTime<Utc>,
}

// --- Stock row as shown to administrators ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryView {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub unit: String,
    pub stock_quantity: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// A single planned decrement produced by the validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDecrement {
    pub stock_id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub required: Decimal,
    pub remaining: Decimal,
}

/// Result of a fulfilled order, handed back to the order endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub store_name: String,
    pub product_name: String,
    pub quantity: i32,
}
