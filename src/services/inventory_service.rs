// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{CatalogRepository, InventoryRepository},
    models::inventory::{InventoryView, StoreInventory},
};

// Administrative stock operations. Orders never go through here.
#[derive(Clone)]
pub struct InventoryService {
    catalog_repo: CatalogRepository,
    inventory_repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(catalog_repo: CatalogRepository, inventory_repo: InventoryRepository) -> Self {
        Self { catalog_repo, inventory_repo }
    }

    // --- RESTOCK ---
    pub async fn restock<'e, E>(
        &self,
        executor: E,
        store_id: i64,
        ingredient_id: i64,
        quantity: Decimal,
    ) -> Result<StoreInventory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = self.inventory_repo
            .restock(executor, store_id, ingredient_id, quantity)
            .await?;

        tracing::info!(
            store_id,
            ingredient_id,
            added = %quantity,
            stock = %row.stock_quantity,
            "store restocked"
        );
        Ok(row)
    }

    // --- STOCK LISTING ---
    pub async fn list_store_inventory<'e, E>(
        &self,
        executor: E,
        store_id: i64,
    ) -> Result<Vec<InventoryView>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        if self.catalog_repo.find_store(executor, store_id).await?.is_none() {
            return Err(AppError::StoreOrIngredientNotFound);
        }
        self.inventory_repo.list_store_inventory(executor, store_id).await
    }
}
