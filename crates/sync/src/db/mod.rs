//! Database operations for the sync engine's `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `shops` - One row per connected store (the tenant)
//! - `products` / `product_variants` / `product_images` - Catalog
//! - `customers` / `customer_addresses` - Customers
//! - `orders` / `order_items` / `order_addresses` - Orders
//! - `collections` / `collection_products` - Collections and membership
//! - `sync_logs` - Per-entity-type sync attempt records
//! - `settings` - Key/value settings (persisted webhook base URL)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/sync/migrations/` and run via:
//! ```bash
//! cargo run -p coral-cli -- migrate
//! ```

pub mod collections;
pub mod customers;
pub mod orders;
pub mod products;
pub mod settings;
pub mod shops;
pub mod sync_logs;

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use coral_core::{CollectionId, CustomerId, OrderId, ProductId, ShopId, SyncLogId};

use crate::mapper::{MappedCollection, MappedCustomer, MappedOrder, MappedProduct, NewShop};
use crate::store::{EntityKind, SyncLog, SyncStore};

pub use collections::CollectionRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use shops::ShopRepository;
pub use sync_logs::SyncLogRepository;

/// Embedded migrations from `crates/sync/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// `PostgreSQL`-backed implementation of [`SyncStore`].
///
/// Thin assembly over the per-entity repositories; the pool supports
/// concurrent use from the parallel entity-type sync tasks.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Look up a shop's local id by its unique domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shop_id_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<ShopId>, RepositoryError> {
        ShopRepository::new(&self.pool).find_by_domain(domain).await
    }
}

impl SyncStore for PgStore {
    async fn upsert_shop(&self, shop: &NewShop) -> Result<ShopId, RepositoryError> {
        ShopRepository::new(&self.pool).upsert(shop).await
    }

    async fn touch_shop_synced(
        &self,
        shop_id: ShopId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        ShopRepository::new(&self.pool)
            .touch_synced(shop_id, at)
            .await
    }

    async fn upsert_product(
        &self,
        shop_id: ShopId,
        record: &MappedProduct,
    ) -> Result<ProductId, RepositoryError> {
        ProductRepository::new(&self.pool).upsert(shop_id, record).await
    }

    async fn upsert_customer(
        &self,
        shop_id: ShopId,
        record: &MappedCustomer,
    ) -> Result<CustomerId, RepositoryError> {
        CustomerRepository::new(&self.pool).upsert(shop_id, record).await
    }

    async fn upsert_order(
        &self,
        shop_id: ShopId,
        record: &MappedOrder,
    ) -> Result<OrderId, RepositoryError> {
        OrderRepository::new(&self.pool).upsert(shop_id, record).await
    }

    async fn upsert_collection(
        &self,
        shop_id: ShopId,
        record: &MappedCollection,
    ) -> Result<CollectionId, RepositoryError> {
        CollectionRepository::new(&self.pool)
            .upsert(shop_id, record)
            .await
    }

    async fn create_sync_log(
        &self,
        shop_id: ShopId,
        entity: EntityKind,
    ) -> Result<SyncLogId, RepositoryError> {
        SyncLogRepository::new(&self.pool).create(shop_id, entity).await
    }

    async fn update_sync_progress(
        &self,
        id: SyncLogId,
        records_processed: i64,
    ) -> Result<(), RepositoryError> {
        SyncLogRepository::new(&self.pool)
            .update_progress(id, records_processed)
            .await
    }

    async fn complete_sync_log(
        &self,
        id: SyncLogId,
        records_processed: i64,
        records_total: i64,
    ) -> Result<(), RepositoryError> {
        SyncLogRepository::new(&self.pool)
            .complete(id, records_processed, records_total)
            .await
    }

    async fn fail_sync_log(
        &self,
        id: SyncLogId,
        records_processed: i64,
        message: &str,
    ) -> Result<(), RepositoryError> {
        SyncLogRepository::new(&self.pool)
            .fail(id, records_processed, message)
            .await
    }

    async fn running_sync_exists(&self, shop_id: ShopId) -> Result<bool, RepositoryError> {
        SyncLogRepository::new(&self.pool)
            .running_exists(shop_id)
            .await
    }

    async fn latest_sync_logs(&self, shop_id: ShopId) -> Result<Vec<SyncLog>, RepositoryError> {
        SyncLogRepository::new(&self.pool)
            .latest_per_entity(shop_id)
            .await
    }

    async fn base_url(&self) -> Result<Option<String>, RepositoryError> {
        match settings::get_setting(&self.pool, settings::BASE_URL_KEY).await? {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "setting {} is not a string",
                        settings::BASE_URL_KEY
                    ))
                }),
        }
    }

    async fn set_base_url(&self, url: &str) -> Result<(), RepositoryError> {
        settings::set_setting(
            &self.pool,
            settings::BASE_URL_KEY,
            &serde_json::Value::String(url.to_string()),
        )
        .await
    }
}
