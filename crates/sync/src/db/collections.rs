//! Collection repository (parent plus product membership join).

use sqlx::PgPool;

use coral_core::{CollectionId, ProductId, ShopId};

use crate::mapper::MappedCollection;

use super::RepositoryError;

/// Repository for collections and their product membership.
pub struct CollectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CollectionRepository<'a> {
    /// Create a new collection repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a collection and replace its product membership in one
    /// transaction.
    ///
    /// Member products are resolved by remote id; members that have no
    /// local row yet are skipped and picked up on the next sync once the
    /// product exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back as a unit.
    pub async fn upsert(
        &self,
        shop_id: ShopId,
        record: &MappedCollection,
    ) -> Result<CollectionId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let collection_id: CollectionId = sqlx::query_scalar(
            r"
            INSERT INTO collections
                (shop_id, remote_id, handle, title, remote_updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (remote_id) DO UPDATE
            SET handle = EXCLUDED.handle,
                title = EXCLUDED.title,
                remote_updated_at = EXCLUDED.remote_updated_at,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(record.collection.remote_id)
        .bind(&record.collection.handle)
        .bind(&record.collection.title)
        .bind(record.collection.remote_updated_at)
        .fetch_one(&mut *tx)
        .await?;

        // Replace membership wholesale so removals converge too.
        sqlx::query("DELETE FROM collection_products WHERE collection_id = $1")
            .bind(collection_id)
            .execute(&mut *tx)
            .await?;

        for remote_id in &record.product_remote_ids {
            let product_id: Option<ProductId> =
                sqlx::query_scalar("SELECT id FROM products WHERE remote_id = $1")
                    .bind(remote_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            if let Some(product_id) = product_id {
                sqlx::query(
                    r"
                    INSERT INTO collection_products (collection_id, product_id)
                    VALUES ($1, $2)
                    ON CONFLICT (collection_id, product_id) DO NOTHING
                    ",
                )
                .bind(collection_id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(collection_id)
    }
}
