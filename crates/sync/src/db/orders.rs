//! Order repository (parent plus line items and the two addresses).

use sqlx::PgPool;

use coral_core::{CustomerId, OrderId, ProductId, RemoteId, ShopId, VariantId};

use crate::mapper::{MappedOrder, NewOrderAddress, NewOrderItem};

use super::RepositoryError;

/// Repository for orders and their children.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert an order with its line items and addresses in one
    /// transaction.
    ///
    /// The customer reference and each line item's variant/product
    /// references are resolved by remote id; a reference to a row that has
    /// not been synced degrades to `NULL`. The platform exposes no stable
    /// line-item key, so line items are replaced wholesale per order on
    /// every sync - repeated runs converge instead of duplicating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back as a unit.
    pub async fn upsert(
        &self,
        shop_id: ShopId,
        record: &MappedOrder,
    ) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let customer_id: Option<CustomerId> = match record.order.customer_remote_id {
            Some(remote_id) => {
                sqlx::query_scalar("SELECT id FROM customers WHERE remote_id = $1")
                    .bind(remote_id)
                    .fetch_optional(&mut *tx)
                    .await?
            }
            None => None,
        };

        let order_id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders
                (shop_id, remote_id, customer_id, order_number,
                 financial_status, fulfillment_status, total_price,
                 currency_code, remote_processed_at, remote_created_at,
                 remote_updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (remote_id) DO UPDATE
            SET customer_id = EXCLUDED.customer_id,
                financial_status = EXCLUDED.financial_status,
                fulfillment_status = EXCLUDED.fulfillment_status,
                total_price = EXCLUDED.total_price,
                currency_code = EXCLUDED.currency_code,
                remote_processed_at = EXCLUDED.remote_processed_at,
                remote_created_at = EXCLUDED.remote_created_at,
                remote_updated_at = EXCLUDED.remote_updated_at,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(record.order.remote_id)
        .bind(customer_id)
        .bind(record.order.order_number)
        .bind(&record.order.financial_status)
        .bind(&record.order.fulfillment_status)
        .bind(record.order.total_price)
        .bind(&record.order.currency_code)
        .bind(record.order.remote_processed_at)
        .bind(record.order.remote_created_at)
        .bind(record.order.remote_updated_at)
        .fetch_one(&mut *tx)
        .await?;

        // Replace line items wholesale: no stable remote key exists for them.
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        for item in &record.items {
            insert_item(&mut tx, order_id, item).await?;
        }

        for address in [&record.shipping_address, &record.billing_address]
            .into_iter()
            .flatten()
        {
            upsert_address(&mut tx, order_id, address).await?;
        }

        tx.commit().await?;

        Ok(order_id)
    }
}

async fn resolve_variant(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    remote_id: Option<RemoteId>,
) -> Result<Option<VariantId>, RepositoryError> {
    match remote_id {
        Some(remote_id) => Ok(sqlx::query_scalar(
            "SELECT id FROM product_variants WHERE remote_id = $1",
        )
        .bind(remote_id)
        .fetch_optional(&mut **tx)
        .await?),
        None => Ok(None),
    }
}

async fn resolve_product(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    remote_id: Option<RemoteId>,
) -> Result<Option<ProductId>, RepositoryError> {
    match remote_id {
        Some(remote_id) => Ok(
            sqlx::query_scalar("SELECT id FROM products WHERE remote_id = $1")
                .bind(remote_id)
                .fetch_optional(&mut **tx)
                .await?,
        ),
        None => Ok(None),
    }
}

async fn insert_item(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: OrderId,
    item: &NewOrderItem,
) -> Result<(), RepositoryError> {
    let variant_id = resolve_variant(tx, item.variant_remote_id).await?;
    let product_id = resolve_product(tx, item.product_remote_id).await?;

    sqlx::query(
        r"
        INSERT INTO order_items
            (order_id, variant_id, product_id, quantity, unit_price)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(order_id)
    .bind(variant_id)
    .bind(product_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn upsert_address(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: OrderId,
    address: &NewOrderAddress,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO order_addresses
            (order_id, kind, first_name, last_name, address1, address2,
             city, province, country, zip, phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (order_id, kind) DO UPDATE
        SET first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            address1 = EXCLUDED.address1,
            address2 = EXCLUDED.address2,
            city = EXCLUDED.city,
            province = EXCLUDED.province,
            country = EXCLUDED.country,
            zip = EXCLUDED.zip,
            phone = EXCLUDED.phone
        ",
    )
    .bind(order_id)
    .bind(address.kind.as_str())
    .bind(&address.first_name)
    .bind(&address.last_name)
    .bind(&address.address1)
    .bind(&address.address2)
    .bind(&address.city)
    .bind(&address.province)
    .bind(&address.country)
    .bind(&address.zip)
    .bind(&address.phone)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
