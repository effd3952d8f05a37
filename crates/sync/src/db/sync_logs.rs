//! Sync-log repository.
//!
//! One row per entity-type sync attempt, mutated in place as the attempt
//! progresses, never deleted. The latest row per entity type is the
//! durable record an operator queries to distinguish "never run",
//! "in progress", "succeeded", and "failed with reason".

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coral_core::{ShopId, SyncLogId};

use crate::store::{EntityKind, SyncLog, SyncStatus};

use super::RepositoryError;

/// Internal row type for sync-log queries.
#[derive(Debug, sqlx::FromRow)]
struct SyncLogRow {
    id: SyncLogId,
    shop_id: ShopId,
    sync_type: String,
    entity_type: String,
    status: String,
    records_processed: i64,
    records_total: Option<i64>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
}

impl TryFrom<SyncLogRow> for SyncLog {
    type Error = RepositoryError;

    fn try_from(row: SyncLogRow) -> Result<Self, Self::Error> {
        let entity = EntityKind::try_from(row.entity_type.as_str())
            .map_err(RepositoryError::DataCorruption)?;
        let status = SyncStatus::try_from(row.status.as_str())
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: row.id,
            shop_id: row.shop_id,
            sync_type: row.sync_type,
            entity,
            status,
            records_processed: row.records_processed,
            records_total: row.records_total,
            started_at: row.started_at,
            completed_at: row.completed_at,
            error_message: row.error_message,
        })
    }
}

/// Repository for sync-log rows.
pub struct SyncLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SyncLogRepository<'a> {
    /// Create a new sync-log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open a sync-log row in `started` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        shop_id: ShopId,
        entity: EntityKind,
    ) -> Result<SyncLogId, RepositoryError> {
        let id: SyncLogId = sqlx::query_scalar(
            r"
            INSERT INTO sync_logs
                (shop_id, sync_type, entity_type, status, records_processed, started_at)
            VALUES ($1, 'initial', $2, 'started', 0, NOW())
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(entity.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Persist the processed counter after a page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_progress(
        &self,
        id: SyncLogId,
        records_processed: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE sync_logs
            SET records_processed = $2
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(records_processed)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Close a sync-log row as `completed`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn complete(
        &self,
        id: SyncLogId,
        records_processed: i64,
        records_total: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE sync_logs
            SET status = 'completed',
                records_processed = $2,
                records_total = $3,
                completed_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(records_processed)
        .bind(records_total)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Close a sync-log row as `failed` with the error message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn fail(
        &self,
        id: SyncLogId,
        records_processed: i64,
        message: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE sync_logs
            SET status = 'failed',
                records_processed = $2,
                error_message = $3,
                completed_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(records_processed)
        .bind(message)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Whether any sync-log row for this shop is `started` without a
    /// completion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn running_exists(&self, shop_id: ShopId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM sync_logs
                WHERE shop_id = $1 AND status = 'started'
            )
            ",
        )
        .bind(shop_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// The most recent sync-log row per entity type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` if a row's status or entity type
    /// is invalid.
    pub async fn latest_per_entity(
        &self,
        shop_id: ShopId,
    ) -> Result<Vec<SyncLog>, RepositoryError> {
        let rows: Vec<SyncLogRow> = sqlx::query_as(
            r"
            SELECT DISTINCT ON (entity_type)
                   id, shop_id, sync_type, entity_type, status,
                   records_processed, records_total, started_at,
                   completed_at, error_message
            FROM sync_logs
            WHERE shop_id = $1
            ORDER BY entity_type, started_at DESC
            ",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
