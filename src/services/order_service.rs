// src/services/order_service.rs

use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres, Transaction};
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::{
        db_utils::{apply_transaction_timeouts, is_timeout},
        error::AppError,
    },
    db::{CatalogRepository, InventoryRepository},
    models::{
        catalog::RecipeLine,
        inventory::{OrderReceipt, StockDecrement, StoreInventory},
    },
};

/// Turns an order into stock decrements, all or nothing.
#[derive(Clone)]
pub struct OrderService {
    catalog_repo: CatalogRepository,
    inventory_repo: InventoryRepository,
    order_timeout: Duration,
}

impl OrderService {
    pub fn new(
        catalog_repo: CatalogRepository,
        inventory_repo: InventoryRepository,
        order_timeout: Duration,
    ) -> Self {
        Self { catalog_repo, inventory_repo, order_timeout }
    }

    // --- PLACE ORDER ---
    /// Validates every ingredient of the recipe against the store's stock and
    /// only then decrements all of them, in one transaction.
    ///
    /// Concurrent orders on the same stock rows queue on the row locks taken
    /// before validation, so a later order always validates against the
    /// stock left by the earlier one.
    ///
    /// `order_timeout` cancels the work up to COMMIT; cancelling drops the
    /// transaction, which rolls it back. COMMIT itself is never abandoned
    /// midway, so the caller always learns whether stock really moved. It is
    /// still bounded by the transaction-local `statement_timeout`.
    pub async fn place_order<'e, A>(
        &self,
        db: A,
        store_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<OrderReceipt, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        if quantity < 1 {
            let mut errors = ValidationErrors::new();
            errors.add("quantity", ValidationError::new("range"));
            return Err(AppError::ValidationError(errors));
        }

        let prepared = tokio::time::timeout(
            self.order_timeout,
            self.prepare(db, store_id, product_id, quantity),
        )
            .await;

        let (tx, receipt, plan) = match prepared {
            Err(_elapsed) => {
                tracing::warn!(store_id, product_id, quantity, "order timed out, rolled back");
                return Err(AppError::Timeout);
            }
            Ok(Err(e)) => return Err(timeout_aware(e, store_id, product_id, quantity)),
            Ok(Ok(prepared)) => prepared,
        };

        tx.commit()
            .await
            .map_err(|e| timeout_aware(e.into(), store_id, product_id, quantity))?;

        for step in &plan {
            tracing::debug!(
                store_id,
                ingredient_id = step.ingredient_id,
                ingredient = %step.ingredient_name,
                used = %step.required,
                remaining = %step.remaining,
                "stock decremented"
            );
        }
        tracing::info!(
            store_id,
            product_id,
            quantity,
            ingredients = plan.len(),
            "order fulfilled"
        );

        Ok(receipt)
    }

    /// Everything up to, but not including, COMMIT. The returned transaction
    /// holds the row locks and the applied decrements.
    async fn prepare<'e, A>(
        &self,
        db: A,
        store_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<(Transaction<'e, Postgres>, OrderReceipt, Vec<StockDecrement>), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        // Any early return drops `tx`, which rolls it back.
        let mut tx = db.begin().await?;
        apply_transaction_timeouts(&mut tx, self.order_timeout).await?;

        // 1. Store and product
        let store = self.catalog_repo.find_store(&mut *tx, store_id).await?;
        let product = self.catalog_repo.find_product(&mut *tx, product_id).await?;
        let (Some(store), Some(product)) = (store, product) else {
            return Err(AppError::StoreOrProductNotFound);
        };

        if !product.is_active {
            return Err(AppError::ProductUnavailable(product.name));
        }

        // 2. Recipe
        let lines = self.catalog_repo.get_recipe_lines(&mut *tx, product.id).await?;
        if lines.is_empty() {
            return Err(AppError::NoRecipe(product.name));
        }

        // 3. Lock, then validate every ingredient before touching any
        let ingredient_ids: Vec<i64> = lines.iter().map(|line| line.ingredient_id).collect();
        let stock = self.inventory_repo
            .lock_stock_rows(&mut *tx, store.id, &ingredient_ids)
            .await?;

        let plan = plan_fulfillment(&lines, &stock, quantity).inspect_err(|e| {
            tracing::info!(store_id, product_id, quantity, reason = %e, "order refused");
        })?;

        // 4. Decrement pass
        for step in &plan {
            self.inventory_repo
                .decrement_stock(&mut *tx, step.stock_id, step.required)
                .await?
                .ok_or_else(|| AppError::InsufficientStock(step.ingredient_name.clone()))?;
        }

        let receipt = OrderReceipt {
            store_name: store.name,
            product_name: product.name,
            quantity,
        };
        Ok((tx, receipt, plan))
    }
}

// Postgres cancelling a statement on `statement_timeout`/`lock_timeout`
// is reported as a timeout, like the tokio deadline.
fn timeout_aware(err: AppError, store_id: i64, product_id: i64, quantity: i32) -> AppError {
    match err {
        AppError::DatabaseError(e) if is_timeout(&e) => {
            tracing::warn!(store_id, product_id, quantity, error = %e, "order hit a database timeout");
            AppError::Timeout
        }
        other => other,
    }
}

/// Validation pass. Computes `amount * quantity` per ingredient (summing
/// repeated recipe lines of the same ingredient) and checks it against the
/// locked stock rows. A missing row counts as zero stock. Fails on the
/// first short ingredient in recipe order; nothing is planned unless every
/// ingredient is covered.
pub fn plan_fulfillment(
    lines: &[RecipeLine],
    stock: &[StoreInventory],
    quantity: i32,
) -> Result<Vec<StockDecrement>, AppError> {
    let multiplier = Decimal::from(quantity);

    let mut required: Vec<(&RecipeLine, Decimal)> = Vec::with_capacity(lines.len());
    for line in lines {
        let need = line.amount * multiplier;
        match required.iter_mut().find(|(seen, _)| seen.ingredient_id == line.ingredient_id) {
            Some((_, total)) => *total += need,
            None => required.push((line, need)),
        }
    }

    let mut plan = Vec::with_capacity(required.len());
    for (line, need) in required {
        let row = stock.iter().find(|row| row.ingredient_id == line.ingredient_id);
        match row {
            Some(row) if row.stock_quantity >= need => plan.push(StockDecrement {
                stock_id: row.id,
                ingredient_id: line.ingredient_id,
                ingredient_name: line.ingredient_name.clone(),
                required: need,
                remaining: row.stock_quantity - need,
            }),
            _ => return Err(AppError::InsufficientStock(line.ingredient_name.clone())),
        }
    }

    Ok(plan)
}
