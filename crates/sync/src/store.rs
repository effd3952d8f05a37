//! The persistence seam.
//!
//! [`SyncStore`] is the repository interface the orchestrator and
//! reconciler write through: idempotent upserts keyed by remote id, the
//! sync-log lifecycle, and the persisted webhook base URL. The production
//! implementation is [`crate::db::PgStore`]; tests use an in-memory
//! implementation.

use chrono::{DateTime, Utc};
use coral_core::{CollectionId, CustomerId, OrderId, ProductId, ShopId, SyncLogId};

use crate::db::RepositoryError;
use crate::mapper::{MappedCollection, MappedCustomer, MappedOrder, MappedProduct, NewShop};

/// The closed set of entity types the engine syncs.
///
/// Per-entity behavior (paginator, mapper, repository adapter, failure
/// policy) is selected by matching on this enum at orchestration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Shop,
    Products,
    Customers,
    Orders,
    Collections,
}

impl EntityKind {
    /// Stable text form used by the `sync_logs.entity_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shop => "shop",
            Self::Products => "products",
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::Collections => "collections",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "shop" => Ok(Self::Shop),
            "products" => Ok(Self::Products),
            "customers" => Ok(Self::Customers),
            "orders" => Ok(Self::Orders),
            "collections" => Ok(Self::Collections),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

/// Lifecycle state of one entity-type sync attempt.
///
/// `started -> (completed | failed)`; there is no other transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Started,
    Completed,
    Failed,
}

impl SyncStatus {
    /// Stable text form used by the `sync_logs.status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SyncStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

/// One entity-type sync attempt as recorded in `sync_logs`.
///
/// One row is created per attempt, mutated in place as the attempt
/// progresses, and never deleted. `completed_at` is set exactly when the
/// status is `completed` or `failed`.
#[derive(Debug, Clone)]
pub struct SyncLog {
    pub id: SyncLogId,
    pub shop_id: ShopId,
    pub sync_type: String,
    pub entity: EntityKind,
    pub status: SyncStatus,
    pub records_processed: i64,
    pub records_total: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

/// Repository interface for the sync engine.
///
/// Upserts are idempotent per entity, keyed by the platform's immutable
/// remote id: insert if no row has the key, else update the existing row's
/// mutable fields, never touching its local primary key or creation
/// timestamp. Children are persisted only after the parent's local id is
/// known, and a child's reference to a row that has not been synced
/// degrades to `NULL` rather than failing the record.
#[allow(async_fn_in_trait)]
pub trait SyncStore {
    /// Create or update the tenant row, returning its local id.
    async fn upsert_shop(&self, shop: &NewShop) -> Result<ShopId, RepositoryError>;

    /// Record a completed sync run on the tenant row.
    async fn touch_shop_synced(
        &self,
        shop_id: ShopId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Upsert a product with its variants and images.
    async fn upsert_product(
        &self,
        shop_id: ShopId,
        record: &MappedProduct,
    ) -> Result<ProductId, RepositoryError>;

    /// Upsert a customer with their addresses.
    async fn upsert_customer(
        &self,
        shop_id: ShopId,
        record: &MappedCustomer,
    ) -> Result<CustomerId, RepositoryError>;

    /// Upsert an order with its line items and addresses. Line items are
    /// replaced wholesale per order on every sync.
    async fn upsert_order(
        &self,
        shop_id: ShopId,
        record: &MappedOrder,
    ) -> Result<OrderId, RepositoryError>;

    /// Upsert a collection and replace its product membership.
    async fn upsert_collection(
        &self,
        shop_id: ShopId,
        record: &MappedCollection,
    ) -> Result<CollectionId, RepositoryError>;

    /// Open a sync-log row in `started` state.
    async fn create_sync_log(
        &self,
        shop_id: ShopId,
        entity: EntityKind,
    ) -> Result<SyncLogId, RepositoryError>;

    /// Persist the in-memory processed counter after a page.
    async fn update_sync_progress(
        &self,
        id: SyncLogId,
        records_processed: i64,
    ) -> Result<(), RepositoryError>;

    /// Close a sync-log row as `completed`.
    async fn complete_sync_log(
        &self,
        id: SyncLogId,
        records_processed: i64,
        records_total: i64,
    ) -> Result<(), RepositoryError>;

    /// Close a sync-log row as `failed` with the error message.
    async fn fail_sync_log(
        &self,
        id: SyncLogId,
        records_processed: i64,
        message: &str,
    ) -> Result<(), RepositoryError>;

    /// Whether any sync-log row for this shop is `started` without a
    /// completion (the single-active-run guard).
    async fn running_sync_exists(&self, shop_id: ShopId) -> Result<bool, RepositoryError>;

    /// The most recent sync-log row per entity type, surfaced verbatim.
    async fn latest_sync_logs(&self, shop_id: ShopId) -> Result<Vec<SyncLog>, RepositoryError>;

    /// The persisted webhook base URL, if one has been set.
    async fn base_url(&self) -> Result<Option<String>, RepositoryError>;

    /// Persist a new webhook base URL.
    async fn set_base_url(&self, url: &str) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_round_trip() {
        for kind in [
            EntityKind::Shop,
            EntityKind::Products,
            EntityKind::Customers,
            EntityKind::Orders,
            EntityKind::Collections,
        ] {
            assert_eq!(EntityKind::try_from(kind.as_str()), Ok(kind));
        }
    }

    #[test]
    fn test_sync_status_round_trip() {
        for status in [
            SyncStatus::Started,
            SyncStatus::Completed,
            SyncStatus::Failed,
        ] {
            assert_eq!(SyncStatus::try_from(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(SyncStatus::try_from("paused").is_err());
        assert!(EntityKind::try_from("gift_cards").is_err());
    }
}
