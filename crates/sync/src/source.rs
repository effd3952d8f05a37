//! The remote read seam.
//!
//! [`RemoteSource`] is everything the engine needs from the upstream
//! platform: one page-fetch operation per entity type, the shop record,
//! and the three webhook subscription operations. The production
//! implementation is [`crate::shopify::AdminClient`]; tests drive the
//! orchestrator and reconciler through scripted implementations.

use crate::shopify::RemoteError;
use crate::shopify::types::{
    Page, RemoteCollection, RemoteCustomer, RemoteOrder, RemoteProduct, RemoteShop,
    RemoteWebhookSubscription,
};

/// Read access to the upstream platform.
///
/// Page fetches carry the standard cursor-pagination variables
/// (`first`, `after`); termination is signaled by the returned page's
/// `has_next_page` flag, never by an empty page. Implementations propagate
/// remote failures verbatim; retry policy belongs to the caller.
#[allow(async_fn_in_trait)]
pub trait RemoteSource {
    /// Fetch the shop record (exactly one per store).
    async fn fetch_shop(&self) -> Result<RemoteShop, RemoteError>;

    /// Fetch one page of products with nested variants and images.
    async fn products_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteProduct>, RemoteError>;

    /// Fetch one page of customers with their addresses.
    async fn customers_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteCustomer>, RemoteError>;

    /// Fetch one page of orders with line items and addresses.
    async fn orders_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteOrder>, RemoteError>;

    /// Fetch one page of collections with member product ids.
    async fn collections_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteCollection>, RemoteError>;

    /// List all webhook subscriptions configured on the platform.
    async fn list_webhooks(&self) -> Result<Vec<RemoteWebhookSubscription>, RemoteError>;

    /// Create a webhook subscription for a slash-form topic
    /// (`products/create`) delivering to `callback_url`. Returns the new
    /// subscription's remote id.
    async fn create_webhook(
        &self,
        topic: &str,
        callback_url: &str,
    ) -> Result<String, RemoteError>;

    /// Delete a webhook subscription by remote id.
    async fn delete_webhook(&self, id: &str) -> Result<(), RemoteError>;
}
