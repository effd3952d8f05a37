//! Sync orchestration.
//!
//! Drives one full sync run: shop first (blocking, it establishes the
//! tenant id every other entity type hangs off), then the catalog entity
//! types concurrently, each with its own sync log. Per-entity-type
//! isolation bounds the blast radius of one API's failure; a rate limit on
//! one entity type never blocks another's already-fetched records from
//! being committed.
//!
//! Entity selection is a closed set ([`EntityKind`]); per-entity behavior
//! lives in one adapter per variant implementing a shared capability
//! interface, chosen by a match at orchestration time.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use coral_core::ShopId;

use crate::db::RepositoryError;
use crate::config::SyncSettings;
use crate::error::SyncError;
use crate::mapper::{self, MapError};
use crate::paginator::{PageFetcher, Paginator};
use crate::shopify::RemoteError;
use crate::shopify::types::{
    Page, RemoteCollection, RemoteCustomer, RemoteOrder, RemoteProduct,
};
use crate::source::RemoteSource;
use crate::store::{EntityKind, SyncStatus, SyncStore};

// =============================================================================
// Run inputs and outputs
// =============================================================================

/// Immutable per-run context threaded through every component call.
#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Local id of the tenant this run belongs to.
    pub shop_id: ShopId,
    /// Webhook base URL in effect when the run started, if resolved.
    pub base_url: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

/// What to do when a single record fails inside an entity-type sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordErrorPolicy {
    /// Abort the entity type's run on the first record failure.
    Abort,
    /// Log the record's failure, count it, and continue with the rest.
    SkipRecord,
}

/// Tuning for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Records requested per page.
    pub page_size: i64,
    /// Whether to sync customers (gated: the read scope may be unavailable).
    pub sync_customers: bool,
    /// Whether to sync orders (gated, same reason).
    pub sync_orders: bool,
    /// Record-failure policy for products.
    pub products_policy: RecordErrorPolicy,
    /// Record-failure policy for collections.
    pub collections_policy: RecordErrorPolicy,
    /// Record-failure policy for customers.
    pub customers_policy: RecordErrorPolicy,
    /// Record-failure policy for orders.
    pub orders_policy: RecordErrorPolicy,
}

impl Default for SyncOptions {
    /// Catalog entity types abort on the first bad record (a broken
    /// product is worth stopping for); customer and order syncs skip bad
    /// records so one malformed legacy row cannot starve the rest.
    fn default() -> Self {
        Self {
            page_size: 50,
            sync_customers: false,
            sync_orders: false,
            products_policy: RecordErrorPolicy::Abort,
            collections_policy: RecordErrorPolicy::Abort,
            customers_policy: RecordErrorPolicy::SkipRecord,
            orders_policy: RecordErrorPolicy::SkipRecord,
        }
    }
}

impl SyncOptions {
    /// Merge environment-driven settings over the default policies.
    #[must_use]
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self {
            page_size: settings.page_size,
            sync_customers: settings.sync_customers,
            sync_orders: settings.sync_orders,
            ..Self::default()
        }
    }

    const fn policy_for(&self, kind: EntityKind) -> RecordErrorPolicy {
        match kind {
            EntityKind::Shop | EntityKind::Products => self.products_policy,
            EntityKind::Collections => self.collections_policy,
            EntityKind::Customers => self.customers_policy,
            EntityKind::Orders => self.orders_policy,
        }
    }
}

/// How one entity type's sync ended.
#[derive(Debug, Clone)]
pub struct EntityOutcome {
    pub entity: EntityKind,
    pub status: SyncStatus,
    pub records_processed: i64,
    pub records_total: i64,
    pub error: Option<String>,
}

impl EntityOutcome {
    const fn completed(entity: EntityKind, processed: i64, total: i64) -> Self {
        Self {
            entity,
            status: SyncStatus::Completed,
            records_processed: processed,
            records_total: total,
            error: None,
        }
    }

    const fn failed(entity: EntityKind, processed: i64, total: i64, error: String) -> Self {
        Self {
            entity,
            status: SyncStatus::Failed,
            records_processed: processed,
            records_total: total,
            error: Some(error),
        }
    }
}

/// The collected outcomes of one full sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub shop_id: ShopId,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<EntityOutcome>,
}

impl SyncReport {
    /// Whether every entity type in the run completed.
    #[must_use]
    pub fn is_fully_successful(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status == SyncStatus::Completed)
    }
}

// =============================================================================
// Entity adapters
// =============================================================================

/// A failure applying one record (mapping or persistence).
#[derive(Debug, Error)]
enum RecordError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Per-entity-type capability: fetch one page, apply one record.
trait EntitySync<R: SyncStore>: PageFetcher {
    const KIND: EntityKind;

    async fn apply(
        &self,
        store: &R,
        shop_id: ShopId,
        raw: &Self::Node,
    ) -> Result<(), RecordError>;
}

struct ProductsSync<'a, S> {
    source: &'a S,
}

impl<S: RemoteSource> PageFetcher for ProductsSync<'_, S> {
    type Node = RemoteProduct;

    async fn fetch(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteProduct>, RemoteError> {
        self.source.products_page(first, after).await
    }
}

impl<S: RemoteSource, R: SyncStore> EntitySync<R> for ProductsSync<'_, S> {
    const KIND: EntityKind = EntityKind::Products;

    async fn apply(
        &self,
        store: &R,
        shop_id: ShopId,
        raw: &RemoteProduct,
    ) -> Result<(), RecordError> {
        let record = mapper::map_product(raw)?;
        store.upsert_product(shop_id, &record).await?;
        Ok(())
    }
}

struct CollectionsSync<'a, S> {
    source: &'a S,
}

impl<S: RemoteSource> PageFetcher for CollectionsSync<'_, S> {
    type Node = RemoteCollection;

    async fn fetch(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteCollection>, RemoteError> {
        self.source.collections_page(first, after).await
    }
}

impl<S: RemoteSource, R: SyncStore> EntitySync<R> for CollectionsSync<'_, S> {
    const KIND: EntityKind = EntityKind::Collections;

    async fn apply(
        &self,
        store: &R,
        shop_id: ShopId,
        raw: &RemoteCollection,
    ) -> Result<(), RecordError> {
        let record = mapper::map_collection(raw)?;
        store.upsert_collection(shop_id, &record).await?;
        Ok(())
    }
}

struct CustomersSync<'a, S> {
    source: &'a S,
}

impl<S: RemoteSource> PageFetcher for CustomersSync<'_, S> {
    type Node = RemoteCustomer;

    async fn fetch(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteCustomer>, RemoteError> {
        self.source.customers_page(first, after).await
    }
}

impl<S: RemoteSource, R: SyncStore> EntitySync<R> for CustomersSync<'_, S> {
    const KIND: EntityKind = EntityKind::Customers;

    async fn apply(
        &self,
        store: &R,
        shop_id: ShopId,
        raw: &RemoteCustomer,
    ) -> Result<(), RecordError> {
        let record = mapper::map_customer(raw)?;
        store.upsert_customer(shop_id, &record).await?;
        Ok(())
    }
}

struct OrdersSync<'a, S> {
    source: &'a S,
}

impl<S: RemoteSource> PageFetcher for OrdersSync<'_, S> {
    type Node = RemoteOrder;

    async fn fetch(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteOrder>, RemoteError> {
        self.source.orders_page(first, after).await
    }
}

impl<S: RemoteSource, R: SyncStore> EntitySync<R> for OrdersSync<'_, S> {
    const KIND: EntityKind = EntityKind::Orders;

    async fn apply(
        &self,
        store: &R,
        shop_id: ShopId,
        raw: &RemoteOrder,
    ) -> Result<(), RecordError> {
        let record = mapper::map_order(raw)?;
        store.upsert_order(shop_id, &record).await?;
        Ok(())
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Sequences one full sync run against a remote source and a store.
///
/// One orchestrator instance owns one run; there is no cross-run shared
/// state. Within a run, pagination inside an entity type is strictly
/// sequential (each cursor depends on the previous response) while the
/// entity types themselves run as independently scheduled tasks joined
/// with individual outcome collection.
pub struct Orchestrator<'a, S, R> {
    source: &'a S,
    store: &'a R,
    options: SyncOptions,
}

impl<'a, S: RemoteSource, R: SyncStore> Orchestrator<'a, S, R> {
    /// Create an orchestrator for one run.
    pub const fn new(source: &'a S, store: &'a R, options: SyncOptions) -> Self {
        Self {
            source,
            store,
            options,
        }
    }

    /// Run a full initial sync.
    ///
    /// Shop sync must succeed; after that, a failure in one entity type is
    /// recorded in its sync log and the report but never cancels a sibling.
    /// The tenant's last-sync timestamp is updated on completion regardless
    /// of per-entity-type failures.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AlreadyRunning`] if another run for this shop
    /// has a `started` sync log without a completion, and the underlying
    /// error if shop sync or sync-log bookkeeping fails.
    #[instrument(skip(self))]
    pub async fn run_initial_sync(&self) -> Result<SyncReport, SyncError> {
        let started_at = Utc::now();

        let (shop_id, shop_outcome) = self.sync_shop().await?;
        let ctx = SyncContext {
            shop_id,
            base_url: self.store.base_url().await?,
            started_at,
        };

        let mut outcomes = vec![shop_outcome];

        let (products, collections) = tokio::join!(
            run_entity_sync(
                self.store,
                &ctx,
                ProductsSync { source: self.source },
                self.options.page_size,
                self.options.policy_for(EntityKind::Products),
            ),
            run_entity_sync(
                self.store,
                &ctx,
                CollectionsSync { source: self.source },
                self.options.page_size,
                self.options.policy_for(EntityKind::Collections),
            ),
        );
        outcomes.push(flatten_outcome(EntityKind::Products, products));
        outcomes.push(flatten_outcome(EntityKind::Collections, collections));

        if self.options.sync_customers && self.options.sync_orders {
            let (customers, orders) = tokio::join!(
                run_entity_sync(
                    self.store,
                    &ctx,
                    CustomersSync { source: self.source },
                    self.options.page_size,
                    self.options.policy_for(EntityKind::Customers),
                ),
                run_entity_sync(
                    self.store,
                    &ctx,
                    OrdersSync { source: self.source },
                    self.options.page_size,
                    self.options.policy_for(EntityKind::Orders),
                ),
            );
            outcomes.push(flatten_outcome(EntityKind::Customers, customers));
            outcomes.push(flatten_outcome(EntityKind::Orders, orders));
        } else if self.options.sync_customers {
            let customers = run_entity_sync(
                self.store,
                &ctx,
                CustomersSync { source: self.source },
                self.options.page_size,
                self.options.policy_for(EntityKind::Customers),
            )
            .await;
            outcomes.push(flatten_outcome(EntityKind::Customers, customers));
        } else if self.options.sync_orders {
            let orders = run_entity_sync(
                self.store,
                &ctx,
                OrdersSync { source: self.source },
                self.options.page_size,
                self.options.policy_for(EntityKind::Orders),
            )
            .await;
            outcomes.push(flatten_outcome(EntityKind::Orders, orders));
        }

        self.store.touch_shop_synced(shop_id, Utc::now()).await?;

        tracing::info!(
            shop_id = %shop_id,
            entities = outcomes.len(),
            fully_successful = outcomes.iter().all(|o| o.status == SyncStatus::Completed),
            "sync run finished"
        );

        Ok(SyncReport {
            shop_id,
            started_at,
            outcomes,
        })
    }

    /// Sync the shop record itself.
    ///
    /// Blocking and fatal on failure: without the tenant row's local id
    /// nothing else can proceed. Also the point where the single-active-run
    /// guard is enforced, once the shop id is known.
    async fn sync_shop(&self) -> Result<(ShopId, EntityOutcome), SyncError> {
        let raw = self.source.fetch_shop().await?;
        let record = mapper::map_shop(&raw)?;
        let shop_id = self.store.upsert_shop(&record).await?;

        if self.store.running_sync_exists(shop_id).await? {
            return Err(SyncError::AlreadyRunning(shop_id));
        }

        let log_id = self
            .store
            .create_sync_log(shop_id, EntityKind::Shop)
            .await?;
        self.store.complete_sync_log(log_id, 1, 1).await?;

        Ok((
            shop_id,
            EntityOutcome::completed(EntityKind::Shop, 1, 1),
        ))
    }
}

/// Drive one entity type: page through the remote source, apply each
/// record, keep the sync log current.
///
/// Entity-level failures (a page fetch error, or a record error under the
/// `Abort` policy) are written to the sync log and returned as a failed
/// outcome. The `Err` branch is reserved for sync-log bookkeeping failures.
async fn run_entity_sync<R, A>(
    store: &R,
    ctx: &SyncContext,
    adapter: A,
    page_size: i64,
    policy: RecordErrorPolicy,
) -> Result<EntityOutcome, RepositoryError>
where
    R: SyncStore,
    A: EntitySync<R>,
{
    let kind = A::KIND;
    let log_id = store.create_sync_log(ctx.shop_id, kind).await?;

    let mut paginator = Paginator::new(&adapter, page_size);
    let mut processed: i64 = 0;
    let mut total: i64 = 0;

    loop {
        let batch = match paginator.next_page().await {
            Ok(Some(nodes)) => nodes,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(entity = %kind, error = %err, "page fetch failed");
                store.fail_sync_log(log_id, processed, &err.to_string()).await?;
                return Ok(EntityOutcome::failed(kind, processed, total, err.to_string()));
            }
        };

        for raw in &batch {
            total += 1;
            match adapter.apply(store, ctx.shop_id, raw).await {
                Ok(()) => processed += 1,
                Err(err) => match policy {
                    RecordErrorPolicy::SkipRecord => {
                        tracing::warn!(entity = %kind, error = %err, "record failed, skipping");
                        processed += 1;
                    }
                    RecordErrorPolicy::Abort => {
                        tracing::warn!(entity = %kind, error = %err, "record failed, aborting");
                        store.fail_sync_log(log_id, processed, &err.to_string()).await?;
                        return Ok(EntityOutcome::failed(
                            kind,
                            processed,
                            total,
                            err.to_string(),
                        ));
                    }
                },
            }
        }

        store.update_sync_progress(log_id, processed).await?;
    }

    store.complete_sync_log(log_id, processed, total).await?;
    Ok(EntityOutcome::completed(kind, processed, total))
}

/// Record a bookkeeping failure as a failed outcome instead of letting it
/// cancel sibling entity types.
fn flatten_outcome(
    kind: EntityKind,
    result: Result<EntityOutcome, RepositoryError>,
) -> EntityOutcome {
    result.unwrap_or_else(|err| {
        tracing::error!(entity = %kind, error = %err, "sync log bookkeeping failed");
        EntityOutcome::failed(kind, 0, 0, err.to_string())
    })
}
