//! Customer repository (parent plus address children).

use sqlx::PgPool;

use coral_core::{CustomerId, ShopId};

use crate::mapper::{MappedCustomer, NewAddress};

use super::RepositoryError;

/// Repository for customers and their addresses.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a customer with their addresses in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back as a unit.
    pub async fn upsert(
        &self,
        shop_id: ShopId,
        record: &MappedCustomer,
    ) -> Result<CustomerId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let customer_id: CustomerId = sqlx::query_scalar(
            r"
            INSERT INTO customers
                (shop_id, remote_id, first_name, last_name, email, phone,
                 total_spent, orders_count, remote_created_at, remote_updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (remote_id) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                total_spent = EXCLUDED.total_spent,
                orders_count = EXCLUDED.orders_count,
                remote_created_at = EXCLUDED.remote_created_at,
                remote_updated_at = EXCLUDED.remote_updated_at,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(record.customer.remote_id)
        .bind(&record.customer.first_name)
        .bind(&record.customer.last_name)
        .bind(&record.customer.email)
        .bind(&record.customer.phone)
        .bind(record.customer.total_spent)
        .bind(record.customer.orders_count)
        .bind(record.customer.remote_created_at)
        .bind(record.customer.remote_updated_at)
        .fetch_one(&mut *tx)
        .await?;

        for address in &record.addresses {
            upsert_address(&mut tx, customer_id, address).await?;
        }

        tx.commit().await?;

        Ok(customer_id)
    }
}

async fn upsert_address(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    customer_id: CustomerId,
    address: &NewAddress,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO customer_addresses
            (customer_id, remote_id, address1, address2, city, province,
             country, zip, is_default)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (remote_id) DO UPDATE
        SET customer_id = EXCLUDED.customer_id,
            address1 = EXCLUDED.address1,
            address2 = EXCLUDED.address2,
            city = EXCLUDED.city,
            province = EXCLUDED.province,
            country = EXCLUDED.country,
            zip = EXCLUDED.zip,
            is_default = EXCLUDED.is_default
        ",
    )
    .bind(customer_id)
    .bind(address.remote_id)
    .bind(&address.address1)
    .bind(&address.address2)
    .bind(&address.city)
    .bind(&address.province)
    .bind(&address.country)
    .bind(&address.zip)
    .bind(address.is_default)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
