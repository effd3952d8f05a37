//! Product repository (parent plus variant and image children).

use sqlx::PgPool;

use coral_core::{ProductId, ShopId};

use crate::mapper::{MappedProduct, NewImage, NewVariant};

use super::RepositoryError;

/// Repository for products and their children.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a product with its variants and images in one transaction.
    ///
    /// Keyed by remote id throughout; children are written only after the
    /// parent's local id is known. Calling twice with identical field sets
    /// leaves the rows unchanged apart from `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back as a unit.
    pub async fn upsert(
        &self,
        shop_id: ShopId,
        record: &MappedProduct,
    ) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product_id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products
                (shop_id, remote_id, title, handle, vendor, status,
                 remote_created_at, remote_updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (remote_id) DO UPDATE
            SET title = EXCLUDED.title,
                handle = EXCLUDED.handle,
                vendor = EXCLUDED.vendor,
                status = EXCLUDED.status,
                remote_created_at = EXCLUDED.remote_created_at,
                remote_updated_at = EXCLUDED.remote_updated_at,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(record.product.remote_id)
        .bind(&record.product.title)
        .bind(&record.product.handle)
        .bind(&record.product.vendor)
        .bind(&record.product.status)
        .bind(record.product.remote_created_at)
        .bind(record.product.remote_updated_at)
        .fetch_one(&mut *tx)
        .await?;

        for variant in &record.variants {
            upsert_variant(&mut tx, product_id, variant).await?;
        }

        for image in &record.images {
            upsert_image(&mut tx, product_id, image).await?;
        }

        tx.commit().await?;

        Ok(product_id)
    }
}

async fn upsert_variant(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: ProductId,
    variant: &NewVariant,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO product_variants
            (product_id, remote_id, title, price, sku, inventory_quantity,
             remote_created_at, remote_updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (remote_id) DO UPDATE
        SET product_id = EXCLUDED.product_id,
            title = EXCLUDED.title,
            price = EXCLUDED.price,
            sku = EXCLUDED.sku,
            inventory_quantity = EXCLUDED.inventory_quantity,
            remote_created_at = EXCLUDED.remote_created_at,
            remote_updated_at = EXCLUDED.remote_updated_at,
            updated_at = NOW()
        ",
    )
    .bind(product_id)
    .bind(variant.remote_id)
    .bind(&variant.title)
    .bind(variant.price)
    .bind(&variant.sku)
    .bind(variant.inventory_quantity)
    .bind(variant.remote_created_at)
    .bind(variant.remote_updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn upsert_image(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: ProductId,
    image: &NewImage,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO product_images
            (product_id, remote_id, alt_text, width, height, src)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (remote_id) DO UPDATE
        SET product_id = EXCLUDED.product_id,
            alt_text = EXCLUDED.alt_text,
            width = EXCLUDED.width,
            height = EXCLUDED.height,
            src = EXCLUDED.src
        ",
    )
    .bind(product_id)
    .bind(image.remote_id)
    .bind(&image.alt_text)
    .bind(image.width)
    .bind(image.height)
    .bind(&image.src)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
