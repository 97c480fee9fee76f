// src/config.rs

use crate::{
    common::i18n::I18n,
    db::{CatalogRepository, InventoryRepository},
    services::{InventoryService, KitchenHub, OrderService},
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, fmt::Display, str::FromStr, sync::Arc, time::Duration};

// Settings read from the environment (a .env file is loaded when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    /// Upper bound for one order transaction, lock waits included.
    pub order_timeout: Duration,
    /// Upper bound for one websocket frame to a kitchen display.
    pub kitchen_send_timeout: Duration,
    /// Events a display may lag behind before it is dropped.
    pub kitchen_buffer: usize,
    pub kitchen_ping_interval: Duration,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            order_timeout: Duration::from_millis(parse_or(&lookup, "ORDER_TIMEOUT_MS", 5000)?),
            kitchen_send_timeout: Duration::from_millis(parse_or(&lookup, "KITCHEN_SEND_TIMEOUT_MS", 2000)?),
            kitchen_buffer: parse_or(&lookup, "KITCHEN_BUFFER", 64)?,
            kitchen_ping_interval: Duration::from_secs(parse_or(&lookup, "KITCHEN_PING_INTERVAL_SECS", 30_u64)?.max(1)),
            cors_origins,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
        None => Ok(default),
    }
}

// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n: Arc<I18n>,
    pub catalog_repo: CatalogRepository,
    pub order_service: OrderService,
    pub inventory_service: InventoryService,
    pub kitchen_hub: Arc<KitchenHub>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("could not connect to the database")?;

        tracing::info!("✅ Database connection established");

        Ok(Self::with_pool(config, db_pool))
    }

    // --- Dependency graph ---
    pub fn with_pool(config: Config, db_pool: PgPool) -> Self {
        let catalog_repo = CatalogRepository::new();
        let inventory_repo = InventoryRepository::new();

        let order_service = OrderService::new(
            catalog_repo.clone(),
            inventory_repo.clone(),
            config.order_timeout,
        );
        let inventory_service = InventoryService::new(catalog_repo.clone(), inventory_repo);
        let kitchen_hub = Arc::new(KitchenHub::new(config.kitchen_buffer));

        Self {
            db_pool,
            config: Arc::new(config),
            i18n: Arc::new(I18n::new()),
            catalog_repo,
            order_service,
            inventory_service,
            kitchen_hub,
        }
    }
}
