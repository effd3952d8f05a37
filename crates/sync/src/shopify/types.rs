//! Remote entity shapes as returned by the Admin API.
//!
//! These mirror the fields selected by the documents in
//! [`super::queries`]. They stay close to the wire format (ids are still
//! `gid://` strings, money is still decimal strings); reduction to local
//! field sets happens in [`crate::mapper`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

// =============================================================================
// Pagination
// =============================================================================

/// Cursor-pagination descriptor carried by every connection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePageInfo {
    /// Whether another page exists after this one.
    pub has_next_page: bool,
    /// Opaque cursor for requesting the next page.
    pub end_cursor: Option<String>,
}

/// A GraphQL connection (`edges[].node` plus `pageInfo`).
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: RemotePageInfo,
}

/// A single connection edge.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    /// Flatten the edges into a [`Page`].
    #[must_use]
    pub fn into_page(self) -> Page<T> {
        Page {
            nodes: self.edges.into_iter().map(|e| e.node).collect(),
            has_next_page: self.page_info.has_next_page,
            end_cursor: self.page_info.end_cursor,
        }
    }

    /// Flatten the edges, discarding pagination info (for nested
    /// single-page child connections).
    #[must_use]
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

/// One page of raw records plus its pagination descriptor.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub nodes: Vec<T>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A terminal page with no records.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            has_next_page: false,
            end_cursor: None,
        }
    }
}

// =============================================================================
// Money
// =============================================================================

/// A money value as delivered by the API (decimal string + currency).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMoney {
    pub amount: Option<String>,
    pub currency_code: Option<String>,
}

/// A `MoneyBag` (we only select the shop-currency leg).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMoneyBag {
    pub shop_money: RemoteMoney,
}

// =============================================================================
// Shop
// =============================================================================

/// The shop record (exactly one per store).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteShop {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub myshopify_domain: String,
    pub currency_code: Option<String>,
}

// =============================================================================
// Products
// =============================================================================

/// A product with its nested variants and images.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub vendor: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub variants: Option<Connection<RemoteVariant>>,
    #[serde(default)]
    pub images: Option<Connection<RemoteImage>>,
}

/// A product variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVariant {
    pub id: String,
    pub title: Option<String>,
    pub price: Option<String>,
    pub sku: Option<String>,
    pub inventory_quantity: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A product image.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteImage {
    pub id: String,
    pub alt_text: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub url: String,
}

// =============================================================================
// Customers
// =============================================================================

/// A customer with their addresses.
///
/// The spend/order aggregates are omitted entirely when the granted API
/// scope does not cover them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCustomer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub amount_spent: Option<RemoteMoney>,
    pub number_of_orders: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub default_address: Option<RemoteAddress>,
    #[serde(default)]
    pub addresses: Vec<RemoteAddress>,
}

/// A customer mailing address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAddress {
    pub id: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// An order with its line items and addresses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrder {
    pub id: String,
    pub number: Option<i64>,
    pub display_financial_status: Option<String>,
    pub display_fulfillment_status: Option<String>,
    pub currency_code: Option<String>,
    pub total_price_set: Option<RemoteMoneyBag>,
    pub customer: Option<RemoteCustomerRef>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub shipping_address: Option<RemoteOrderAddress>,
    pub billing_address: Option<RemoteOrderAddress>,
    #[serde(default)]
    pub line_items: Option<Connection<RemoteLineItem>>,
}

/// Reference to the customer that placed an order.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCustomerRef {
    pub id: String,
}

/// An order line item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLineItem {
    pub id: String,
    pub quantity: i64,
    pub variant: Option<RemoteRef>,
    pub product: Option<RemoteRef>,
    pub original_unit_price_set: Option<RemoteMoneyBag>,
}

/// A bare id reference to another remote entity.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRef {
    pub id: String,
}

/// An order's shipping or billing address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrderAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Collections
// =============================================================================

/// A collection with the ids of its member products.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCollection {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub products: Option<Connection<RemoteRef>>,
}

// =============================================================================
// Webhook subscriptions
// =============================================================================

/// A webhook subscription as configured on the platform.
///
/// The platform is the source of truth for these; they are never persisted
/// locally beyond the reconciliation diff.
#[derive(Debug, Clone)]
pub struct RemoteWebhookSubscription {
    /// Remote global id (used for deletion).
    pub id: String,
    /// Topic in slash form, e.g. `products/create`.
    pub topic: String,
    /// HTTP callback URL the platform delivers to.
    pub callback_url: String,
}

/// Wire shape of a webhook subscription node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSubscriptionNode {
    pub id: String,
    pub topic: String,
    pub endpoint: Option<WebhookEndpoint>,
}

/// Wire shape of a webhook delivery endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEndpoint {
    #[serde(default)]
    pub callback_url: Option<String>,
}

/// Convert a slash-form topic (`products/create`) to the API's enum form
/// (`PRODUCTS_CREATE`).
///
/// Only the first slash separates resource from event; later underscores
/// are part of the event name (`app/scopes_update` -> `APP_SCOPES_UPDATE`).
#[must_use]
pub fn topic_to_remote(topic: &str) -> String {
    topic.replacen('/', "_", 1).to_uppercase()
}

/// Convert an API enum topic (`PRODUCTS_CREATE`) back to slash form
/// (`products/create`).
#[must_use]
pub fn topic_from_remote(topic: &str) -> String {
    topic.to_lowercase().replacen('_', "/", 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_round_trip() {
        for topic in [
            "products/create",
            "products/update",
            "app/uninstalled",
            "app/scopes_update",
        ] {
            let remote = topic_to_remote(topic);
            assert_eq!(topic_from_remote(&remote), topic);
        }
    }

    #[test]
    fn test_topic_to_remote_scopes_update() {
        assert_eq!(topic_to_remote("app/scopes_update"), "APP_SCOPES_UPDATE");
    }

    #[test]
    fn test_connection_into_page() {
        let conn: Connection<i32> = serde_json::from_value(serde_json::json!({
            "edges": [{"node": 1}, {"node": 2}],
            "pageInfo": {"hasNextPage": true, "endCursor": "abc"}
        }))
        .unwrap();
        let page = conn.into_page();
        assert_eq!(page.nodes, vec![1, 2]);
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_page_is_terminal() {
        let page: Page<RemoteProduct> = Page::empty();
        assert!(!page.has_next_page);
        assert!(page.nodes.is_empty());
    }
}
