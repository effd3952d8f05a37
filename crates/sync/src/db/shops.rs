//! Shop (tenant) repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coral_core::ShopId;

use crate::mapper::NewShop;

use super::RepositoryError;

/// Repository for tenant rows.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create or update the tenant row, keyed by the platform's shop id.
    ///
    /// The local primary key and `created_at` are never touched on update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, shop: &NewShop) -> Result<ShopId, RepositoryError> {
        let id: ShopId = sqlx::query_scalar(
            r"
            INSERT INTO shops (remote_id, domain, name, email, currency_code)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (remote_id) DO UPDATE
            SET domain = EXCLUDED.domain,
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                currency_code = EXCLUDED.currency_code,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(shop.remote_id)
        .bind(&shop.domain)
        .bind(&shop.name)
        .bind(&shop.email)
        .bind(&shop.currency_code)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Record a completed sync run on the tenant row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_synced(
        &self,
        shop_id: ShopId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE shops
            SET last_synced_at = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(shop_id)
        .bind(at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Look up a shop's local id by its unique domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_domain(&self, domain: &str) -> Result<Option<ShopId>, RepositoryError> {
        let id: Option<ShopId> = sqlx::query_scalar(
            r"
            SELECT id FROM shops WHERE domain = $1
            ",
        )
        .bind(domain)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }
}
