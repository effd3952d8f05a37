//! Shared fixtures: an in-memory `SyncStore` and a scripted `RemoteSource`.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use coral_core::{
    CollectionId, CustomerId, OrderId, ProductId, RemoteId, ShopId, SyncLogId, VariantId,
};
use coral_sync::db::RepositoryError;
use coral_sync::mapper::{
    MappedCollection, MappedCustomer, MappedOrder, MappedProduct, NewCustomer, NewOrder,
    NewOrderItem, NewProduct, NewShop, NewVariant,
};
use coral_sync::shopify::RemoteError;
use coral_sync::shopify::types::{
    Page, RemoteCollection, RemoteCustomer, RemoteOrder, RemoteProduct, RemoteShop,
    RemoteWebhookSubscription,
};
use coral_sync::source::RemoteSource;
use coral_sync::store::{EntityKind, SyncLog, SyncStatus, SyncStore};

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Debug, Clone)]
pub struct StoredShop {
    pub id: ShopId,
    pub record: NewShop,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct StoredProduct {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub record: NewProduct,
}

#[derive(Debug, Clone)]
pub struct StoredVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub record: NewVariant,
}

#[derive(Debug, Clone)]
pub struct StoredCustomer {
    pub id: CustomerId,
    pub record: NewCustomer,
}

#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: OrderId,
    pub record: NewOrder,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Default)]
pub struct MemState {
    next_id: i32,
    pub shops: HashMap<RemoteId, StoredShop>,
    pub products: HashMap<RemoteId, StoredProduct>,
    pub variants: HashMap<RemoteId, StoredVariant>,
    pub customers: HashMap<RemoteId, StoredCustomer>,
    pub orders: HashMap<RemoteId, StoredOrder>,
    pub collections: HashMap<RemoteId, CollectionId>,
    pub collection_members: HashMap<CollectionId, Vec<ProductId>>,
    pub sync_logs: Vec<SyncLog>,
    pub base_url: Option<String>,
}

impl MemState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of the repository seam.
#[derive(Debug, Default)]
pub struct MemStore {
    pub state: Mutex<MemState>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a dangling `started` sync log, as left behind by a crashed run.
    pub fn seed_running_sync(&self, shop_remote_id: RemoteId, domain: &str) -> ShopId {
        let mut state = self.state.lock().unwrap();
        let shop_id = ShopId::new(state.next_id());
        state.shops.insert(
            shop_remote_id,
            StoredShop {
                id: shop_id,
                record: NewShop {
                    remote_id: shop_remote_id,
                    domain: domain.to_string(),
                    name: domain.to_string(),
                    email: None,
                    currency_code: None,
                },
                last_synced_at: None,
            },
        );
        let log_id = SyncLogId::new(state.next_id());
        state.sync_logs.push(SyncLog {
            id: log_id,
            shop_id,
            sync_type: "initial".to_string(),
            entity: EntityKind::Products,
            status: SyncStatus::Started,
            records_processed: 0,
            records_total: None,
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
        });
        shop_id
    }

    pub fn sync_log_for(&self, entity: EntityKind) -> SyncLog {
        let state = self.state.lock().unwrap();
        state
            .sync_logs
            .iter()
            .filter(|log| log.entity == entity)
            .next_back()
            .cloned()
            .expect("no sync log for entity")
    }
}

impl SyncStore for MemStore {
    async fn upsert_shop(&self, shop: &NewShop) -> Result<ShopId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.shops.get_mut(&shop.remote_id) {
            existing.record = shop.clone();
            return Ok(existing.id);
        }
        let id = ShopId::new(state.next_id());
        state.shops.insert(
            shop.remote_id,
            StoredShop {
                id,
                record: shop.clone(),
                last_synced_at: None,
            },
        );
        Ok(id)
    }

    async fn touch_shop_synced(
        &self,
        shop_id: ShopId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        for shop in state.shops.values_mut() {
            if shop.id == shop_id {
                shop.last_synced_at = Some(at);
            }
        }
        Ok(())
    }

    async fn upsert_product(
        &self,
        shop_id: ShopId,
        record: &MappedProduct,
    ) -> Result<ProductId, RepositoryError> {
        let mut state = self.state.lock().unwrap();

        let product_id = match state.products.get_mut(&record.product.remote_id) {
            Some(existing) => {
                existing.record = record.product.clone();
                existing.id
            }
            None => {
                let id = ProductId::new(state.next_id());
                state.products.insert(
                    record.product.remote_id,
                    StoredProduct {
                        id,
                        shop_id,
                        record: record.product.clone(),
                    },
                );
                id
            }
        };

        for variant in &record.variants {
            match state.variants.get_mut(&variant.remote_id) {
                Some(existing) => {
                    existing.record = variant.clone();
                    existing.product_id = product_id;
                }
                None => {
                    let id = VariantId::new(state.next_id());
                    state.variants.insert(
                        variant.remote_id,
                        StoredVariant {
                            id,
                            product_id,
                            record: variant.clone(),
                        },
                    );
                }
            }
        }

        Ok(product_id)
    }

    async fn upsert_customer(
        &self,
        _shop_id: ShopId,
        record: &MappedCustomer,
    ) -> Result<CustomerId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.customers.get_mut(&record.customer.remote_id) {
            existing.record = record.customer.clone();
            return Ok(existing.id);
        }
        let id = CustomerId::new(state.next_id());
        state.customers.insert(
            record.customer.remote_id,
            StoredCustomer {
                id,
                record: record.customer.clone(),
            },
        );
        Ok(id)
    }

    async fn upsert_order(
        &self,
        _shop_id: ShopId,
        record: &MappedOrder,
    ) -> Result<OrderId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.orders.get_mut(&record.order.remote_id) {
            existing.record = record.order.clone();
            existing.items = record.items.clone();
            return Ok(existing.id);
        }
        let id = OrderId::new(state.next_id());
        state.orders.insert(
            record.order.remote_id,
            StoredOrder {
                id,
                record: record.order.clone(),
                items: record.items.clone(),
            },
        );
        Ok(id)
    }

    async fn upsert_collection(
        &self,
        _shop_id: ShopId,
        record: &MappedCollection,
    ) -> Result<CollectionId, RepositoryError> {
        let mut state = self.state.lock().unwrap();

        let collection_id = match state.collections.get(&record.collection.remote_id) {
            Some(id) => *id,
            None => {
                let id = CollectionId::new(state.next_id());
                state.collections.insert(record.collection.remote_id, id);
                id
            }
        };

        let members = record
            .product_remote_ids
            .iter()
            .filter_map(|remote_id| state.products.get(remote_id).map(|p| p.id))
            .collect();
        state.collection_members.insert(collection_id, members);

        Ok(collection_id)
    }

    async fn create_sync_log(
        &self,
        shop_id: ShopId,
        entity: EntityKind,
    ) -> Result<SyncLogId, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let id = SyncLogId::new(state.next_id());
        state.sync_logs.push(SyncLog {
            id,
            shop_id,
            sync_type: "initial".to_string(),
            entity,
            status: SyncStatus::Started,
            records_processed: 0,
            records_total: None,
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
        });
        Ok(id)
    }

    async fn update_sync_progress(
        &self,
        id: SyncLogId,
        records_processed: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        for log in &mut state.sync_logs {
            if log.id == id {
                log.records_processed = records_processed;
            }
        }
        Ok(())
    }

    async fn complete_sync_log(
        &self,
        id: SyncLogId,
        records_processed: i64,
        records_total: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        for log in &mut state.sync_logs {
            if log.id == id {
                log.status = SyncStatus::Completed;
                log.records_processed = records_processed;
                log.records_total = Some(records_total);
                log.completed_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn fail_sync_log(
        &self,
        id: SyncLogId,
        records_processed: i64,
        message: &str,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        for log in &mut state.sync_logs {
            if log.id == id {
                log.status = SyncStatus::Failed;
                log.records_processed = records_processed;
                log.error_message = Some(message.to_string());
                log.completed_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn running_sync_exists(&self, shop_id: ShopId) -> Result<bool, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sync_logs
            .iter()
            .any(|log| log.shop_id == shop_id && log.status == SyncStatus::Started))
    }

    async fn latest_sync_logs(&self, shop_id: ShopId) -> Result<Vec<SyncLog>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut latest: HashMap<&'static str, SyncLog> = HashMap::new();
        for log in &state.sync_logs {
            if log.shop_id == shop_id {
                latest.insert(log.entity.as_str(), log.clone());
            }
        }
        Ok(latest.into_values().collect())
    }

    async fn base_url(&self) -> Result<Option<String>, RepositoryError> {
        Ok(self.state.lock().unwrap().base_url.clone())
    }

    async fn set_base_url(&self, url: &str) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().base_url = Some(url.to_string());
        Ok(())
    }
}

// =============================================================================
// Scripted remote source
// =============================================================================

/// Counts of page requests issued per entity type.
#[derive(Debug, Default)]
pub struct RequestCounts {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
    pub collections: usize,
}

/// A `RemoteSource` that replays fixed pages and tracks webhook state.
pub struct ScriptedSource {
    pub shop: RemoteShop,
    pub product_pages: Vec<Vec<RemoteProduct>>,
    pub customer_pages: Vec<Vec<RemoteCustomer>>,
    pub order_pages: Vec<Vec<RemoteOrder>>,
    pub collection_pages: Vec<Vec<RemoteCollection>>,
    pub requests: Mutex<RequestCounts>,
    /// Current remote webhook state; create/delete mutate it so a second
    /// reconciliation pass observes the converged configuration.
    pub webhooks: Mutex<Vec<RemoteWebhookSubscription>>,
    /// Subscription ids whose deletion fails.
    pub failing_deletes: Vec<String>,
    /// Topics whose creation fails.
    pub failing_creates: Vec<String>,
    pub created_webhooks: Mutex<Vec<(String, String)>>,
    pub deleted_webhooks: Mutex<Vec<String>>,
    next_webhook_id: Mutex<i64>,
}

impl ScriptedSource {
    pub fn new(shop: RemoteShop) -> Self {
        Self {
            shop,
            product_pages: Vec::new(),
            customer_pages: Vec::new(),
            order_pages: Vec::new(),
            collection_pages: Vec::new(),
            requests: Mutex::new(RequestCounts::default()),
            webhooks: Mutex::new(Vec::new()),
            failing_deletes: Vec::new(),
            failing_creates: Vec::new(),
            created_webhooks: Mutex::new(Vec::new()),
            deleted_webhooks: Mutex::new(Vec::new()),
            next_webhook_id: Mutex::new(9000),
        }
    }

    fn page<T: Clone>(pages: &[Vec<T>], after: Option<&str>) -> Page<T> {
        let index = after.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        match pages.get(index) {
            None => Page::empty(),
            Some(nodes) => Page {
                nodes: nodes.clone(),
                has_next_page: index + 1 < pages.len(),
                end_cursor: Some((index + 1).to_string()),
            },
        }
    }
}

pub fn shop_fixture() -> RemoteShop {
    serde_json::from_value(serde_json::json!({
        "id": "gid://shopify/Shop/548380009",
        "name": "Coral Test Store",
        "email": "owner@example.com",
        "myshopifyDomain": "coral-test.myshopify.com",
        "currencyCode": "USD"
    }))
    .unwrap()
}

/// A product with `variant_count` variants, priced `price`.
pub fn product_fixture(remote_id: i64, price: &str, variant_count: usize) -> RemoteProduct {
    let variants: Vec<serde_json::Value> = (0..variant_count)
        .map(|i| {
            serde_json::json!({"node": {
                "id": format!("gid://shopify/ProductVariant/{}", remote_id * 100 + i as i64),
                "title": format!("Variant {i}"),
                "price": price,
                "sku": format!("SKU-{remote_id}-{i}"),
                "inventoryQuantity": 10
            }})
        })
        .collect();

    serde_json::from_value(serde_json::json!({
        "id": format!("gid://shopify/Product/{remote_id}"),
        "title": format!("Product {remote_id}"),
        "handle": format!("product-{remote_id}"),
        "vendor": "Coral Supply Co",
        "status": "ACTIVE",
        "variants": {"edges": variants},
        "images": {"edges": []}
    }))
    .unwrap()
}

/// A product whose global id does not reduce to a number; mapping it
/// fails the record.
pub fn poisoned_product_fixture() -> RemoteProduct {
    serde_json::from_value(serde_json::json!({
        "id": "gid://shopify/Product/not-a-number",
        "title": "Poisoned",
        "handle": "poisoned"
    }))
    .unwrap()
}

pub fn collection_fixture(remote_id: i64, member_remote_ids: &[i64]) -> RemoteCollection {
    let members: Vec<serde_json::Value> = member_remote_ids
        .iter()
        .map(|id| serde_json::json!({"node": {"id": format!("gid://shopify/Product/{id}")}}))
        .collect();

    serde_json::from_value(serde_json::json!({
        "id": format!("gid://shopify/Collection/{remote_id}"),
        "handle": format!("collection-{remote_id}"),
        "title": format!("Collection {remote_id}"),
        "products": {"edges": members}
    }))
    .unwrap()
}

pub fn customer_fixture(remote_id: i64) -> RemoteCustomer {
    serde_json::from_value(serde_json::json!({
        "id": format!("gid://shopify/Customer/{remote_id}"),
        "firstName": "Mar",
        "lastName": "Lin",
        "email": format!("customer{remote_id}@example.com"),
        "addresses": []
    }))
    .unwrap()
}

pub fn poisoned_customer_fixture() -> RemoteCustomer {
    serde_json::from_value(serde_json::json!({
        "id": "gid://shopify/Customer/broken",
        "addresses": []
    }))
    .unwrap()
}

pub fn webhook_fixture(id: i64, topic: &str, callback_url: &str) -> RemoteWebhookSubscription {
    RemoteWebhookSubscription {
        id: format!("gid://shopify/WebhookSubscription/{id}"),
        topic: topic.to_string(),
        callback_url: callback_url.to_string(),
    }
}

impl RemoteSource for ScriptedSource {
    async fn fetch_shop(&self) -> Result<RemoteShop, RemoteError> {
        Ok(self.shop.clone())
    }

    async fn products_page(
        &self,
        _first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteProduct>, RemoteError> {
        self.requests.lock().unwrap().products += 1;
        Ok(Self::page(&self.product_pages, after.as_deref()))
    }

    async fn customers_page(
        &self,
        _first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteCustomer>, RemoteError> {
        self.requests.lock().unwrap().customers += 1;
        Ok(Self::page(&self.customer_pages, after.as_deref()))
    }

    async fn orders_page(
        &self,
        _first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteOrder>, RemoteError> {
        self.requests.lock().unwrap().orders += 1;
        Ok(Self::page(&self.order_pages, after.as_deref()))
    }

    async fn collections_page(
        &self,
        _first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteCollection>, RemoteError> {
        self.requests.lock().unwrap().collections += 1;
        Ok(Self::page(&self.collection_pages, after.as_deref()))
    }

    async fn list_webhooks(&self) -> Result<Vec<RemoteWebhookSubscription>, RemoteError> {
        Ok(self.webhooks.lock().unwrap().clone())
    }

    async fn create_webhook(
        &self,
        topic: &str,
        callback_url: &str,
    ) -> Result<String, RemoteError> {
        if self.failing_creates.iter().any(|t| t == topic) {
            return Err(RemoteError::UserError(format!("{topic}: Topic not allowed")));
        }

        let mut next_id = self.next_webhook_id.lock().unwrap();
        *next_id += 1;
        let id = format!("gid://shopify/WebhookSubscription/{}", *next_id);

        self.webhooks.lock().unwrap().push(RemoteWebhookSubscription {
            id: id.clone(),
            topic: topic.to_string(),
            callback_url: callback_url.to_string(),
        });
        self.created_webhooks
            .lock()
            .unwrap()
            .push((topic.to_string(), callback_url.to_string()));

        Ok(id)
    }

    async fn delete_webhook(&self, id: &str) -> Result<(), RemoteError> {
        if self.failing_deletes.iter().any(|f| f == id) {
            return Err(RemoteError::UserError(format!(
                "subscription {id} cannot be deleted"
            )));
        }
        self.webhooks.lock().unwrap().retain(|sub| sub.id != id);
        self.deleted_webhooks.lock().unwrap().push(id.to_string());
        Ok(())
    }
}
