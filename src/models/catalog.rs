// src/models/catalog.rs

use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use sqlx::FromRow;

// --- Stores ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
}

// --- Products (menu) ---
// `price` is in whole currency units.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub category_id: Option<i64>,
}

// --- Recipe line ---
// One row of `recipes` joined with its ingredient, so the engine can name
// the ingredient in an out-of-stock error without a second query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeLine {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    /// Consumed per single unit of product.
    pub amount: Decimal,
}
