// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};
use crate::{
    common::error::AppError,
    models::catalog::{Product, RecipeLine, Store},
};

// Read-only access to stores, products and recipes.
// Rows here are maintained by administrators; the order path only reads them.
#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_store<'e, E>(
        &self,
        executor: E,
        store_id: i64,
    ) -> Result<Option<Store>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let store = sqlx::query_as::<_, Store>(
            "SELECT id, name, address FROM stores WHERE id = $1",
        )
            .bind(store_id)
            .fetch_optional(executor)
            .await?;
        Ok(store)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, image_url, is_active, category_id
            FROM products
            WHERE id = $1
            "#,
        )
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// The menu: every product still on sale.
    pub async fn list_active_products<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, image_url, is_active, category_id
            FROM products
            WHERE is_active = TRUE
            ORDER BY id ASC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    /// Recipe lines of a product in a stable order (recipe id), so the first
    /// failing ingredient reported to the customer is deterministic.
    pub async fn get_recipe_lines<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<Vec<RecipeLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, RecipeLine>(
            r#"
            SELECT r.ingredient_id,
                   i.name AS ingredient_name,
                   r.amount
            FROM recipes r
            JOIN ingredients i ON i.id = r.ingredient_id
            WHERE r.product_id = $1
            ORDER BY r.id ASC
            "#,
        )
            .bind(product_id)
            .fetch_all(executor)
            .await?;
        Ok(lines)
    }
}
