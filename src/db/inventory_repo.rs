// src/db/inventory_repo.rs

use sqlx::{Executor, Postgres};
use rust_decimal::Decimal;
use crate::{
    common::{db_utils::is_numeric_overflow, error::AppError},
    models::inventory::{InventoryView, StoreInventory},
};

#[derive(Clone, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Reads
    // ---

    pub async fn list_store_inventory<'e, E>(
        &self,
        executor: E,
        store_id: i64,
    ) -> Result<Vec<InventoryView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, InventoryView>(
            r#"
            SELECT si.ingredient_id,
                   i.name AS ingredient_name,
                   i.unit,
                   si.stock_quantity,
                   si.updated_at
            FROM store_inventory si
            JOIN ingredients i ON i.id = si.ingredient_id
            WHERE si.store_id = $1
            ORDER BY i.name ASC
            "#,
        )
            .bind(store_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    // ---
    // Transactional writes
    // ---
    // Must run inside the caller's transaction.

    /// Locks the stock rows of `ingredient_ids` at `store_id` until the
    /// transaction ends. Rows are locked in ingredient id order so two orders
    /// touching the same ingredients always queue instead of deadlocking.
    /// Ingredients without a stock row are simply absent from the result.
    pub async fn lock_stock_rows<'e, E>(
        &self,
        executor: E,
        store_id: i64,
        ingredient_ids: &[i64],
    ) -> Result<Vec<StoreInventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, StoreInventory>(
            r#"
            SELECT id, store_id, ingredient_id, stock_quantity, updated_at
            FROM store_inventory
            WHERE store_id = $1 AND ingredient_id = ANY($2)
            ORDER BY ingredient_id ASC
            FOR UPDATE
            "#,
        )
            .bind(store_id)
            .bind(ingredient_ids)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Subtracts `amount` from one stock row. The `WHERE` guard keeps the
    /// non-negative invariant even if a caller skipped the lock; `None`
    /// means the guard refused the decrement.
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        stock_id: i64,
        amount: Decimal,
    ) -> Result<Option<StoreInventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, StoreInventory>(
            r#"
            UPDATE store_inventory
            SET stock_quantity = stock_quantity - $2,
                updated_at = NOW()
            WHERE id = $1 AND stock_quantity >= $2
            RETURNING id, store_id, ingredient_id, stock_quantity, updated_at
            "#,
        )
            .bind(stock_id)
            .bind(amount)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Adds stock for (store, ingredient), creating the row on first restock.
    /// Atomic UPSERT: concurrent restocks and orders never lose an update.
    pub async fn restock<'e, E>(
        &self,
        executor: E,
        store_id: i64,
        ingredient_id: i64,
        amount: Decimal,
    ) -> Result<StoreInventory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StoreInventory>(
            r#"
            INSERT INTO store_inventory (store_id, ingredient_id, stock_quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (store_id, ingredient_id)
            DO UPDATE SET
                stock_quantity = store_inventory.stock_quantity + EXCLUDED.stock_quantity,
                updated_at = NOW()
            RETURNING id, store_id, ingredient_id, stock_quantity, updated_at
            "#,
        )
            .bind(store_id)
            .bind(ingredient_id)
            .bind(amount)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::StoreOrIngredientNotFound;
                    }
                }
                if is_numeric_overflow(&e) {
                    return AppError::StockOutOfRange;
                }
                e.into()
            })
    }
}
