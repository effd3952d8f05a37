//! Order mapping (parent plus line items and the two addresses).

use chrono::{DateTime, Utc};
use coral_core::{RemoteId, parse_money};
use rust_decimal::Decimal;

use crate::shopify::types::{RemoteLineItem, RemoteOrder, RemoteOrderAddress};

use super::MapError;

/// Which of an order's two address slots a field set fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Shipping,
    Billing,
}

impl AddressKind {
    /// Stable text form used by the `order_addresses.kind` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Billing => "billing",
        }
    }
}

/// Field set for an order row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub remote_id: RemoteId,
    /// Remote id of the placing customer, resolved to a local row by the
    /// repository (`NULL` when the customer has not been synced).
    pub customer_remote_id: Option<RemoteId>,
    pub order_number: i64,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Option<Decimal>,
    pub currency_code: Option<String>,
    pub remote_processed_at: Option<DateTime<Utc>>,
    pub remote_created_at: Option<DateTime<Utc>>,
    pub remote_updated_at: Option<DateTime<Utc>>,
}

/// Field set for an order line item row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub variant_remote_id: Option<RemoteId>,
    pub product_remote_id: Option<RemoteId>,
    pub quantity: i64,
    pub unit_price: Option<Decimal>,
}

/// Field set for an order's shipping or billing address row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderAddress {
    pub kind: AddressKind,
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

/// A mapped order with its child field sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedOrder {
    pub order: NewOrder,
    pub items: Vec<NewOrderItem>,
    pub shipping_address: Option<NewOrderAddress>,
    pub billing_address: Option<NewOrderAddress>,
}

/// Map one raw order (line items, shipping and billing addresses) onto
/// local field sets.
///
/// A line item's variant or product reference with an unparsable id
/// degrades to `None` rather than failing the order: the reference is
/// advisory, the quantity and price are the record.
///
/// # Errors
///
/// Returns [`MapError::RemoteId`] if the order's global id is not numeric
/// and [`MapError::Malformed`] if the order carries no order number.
pub fn map_order(raw: &RemoteOrder) -> Result<MappedOrder, MapError> {
    let order_number = raw.number.ok_or(MapError::Malformed {
        entity: "order",
        reason: "missing order number".to_string(),
    })?;

    let order = NewOrder {
        remote_id: RemoteId::parse_gid(&raw.id)?,
        customer_remote_id: raw
            .customer
            .as_ref()
            .and_then(|c| RemoteId::parse_gid(&c.id).ok()),
        order_number,
        financial_status: raw
            .display_financial_status
            .as_deref()
            .map(str::to_ascii_lowercase),
        fulfillment_status: raw
            .display_fulfillment_status
            .as_deref()
            .map(str::to_ascii_lowercase),
        total_price: raw
            .total_price_set
            .as_ref()
            .and_then(|set| parse_money(set.shop_money.amount.as_deref())),
        currency_code: raw.currency_code.clone(),
        remote_processed_at: raw.processed_at,
        remote_created_at: raw.created_at,
        remote_updated_at: raw.updated_at,
    };

    let items = match &raw.line_items {
        Some(conn) => conn.edges.iter().map(|e| map_line_item(&e.node)).collect(),
        None => Vec::new(),
    };

    Ok(MappedOrder {
        order,
        items,
        shipping_address: raw
            .shipping_address
            .as_ref()
            .map(|a| map_order_address(a, AddressKind::Shipping)),
        billing_address: raw
            .billing_address
            .as_ref()
            .map(|a| map_order_address(a, AddressKind::Billing)),
    })
}

fn map_line_item(raw: &RemoteLineItem) -> NewOrderItem {
    NewOrderItem {
        variant_remote_id: raw
            .variant
            .as_ref()
            .and_then(|v| RemoteId::parse_gid(&v.id).ok()),
        product_remote_id: raw
            .product
            .as_ref()
            .and_then(|p| RemoteId::parse_gid(&p.id).ok()),
        quantity: raw.quantity,
        unit_price: raw
            .original_unit_price_set
            .as_ref()
            .and_then(|set| parse_money(set.shop_money.amount.as_deref())),
    }
}

fn map_order_address(raw: &RemoteOrderAddress, kind: AddressKind) -> NewOrderAddress {
    NewOrderAddress {
        kind,
        first_name: raw.first_name.clone(),
        last_name: raw.last_name.clone(),
        address1: raw.address1.clone(),
        address2: raw.address2.clone(),
        city: raw.city.clone(),
        province: raw.province.clone(),
        country: raw.country.clone(),
        zip: raw.zip.clone(),
        phone: raw.phone.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixture() -> RemoteOrder {
        serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Order/7001",
            "number": 1042,
            "displayFinancialStatus": "PAID",
            "displayFulfillmentStatus": "UNFULFILLED",
            "currencyCode": "USD",
            "totalPriceSet": {"shopMoney": {"amount": "59.97", "currencyCode": "USD"}},
            "customer": {"id": "gid://shopify/Customer/4411"},
            "processedAt": "2025-06-10T10:00:00Z",
            "createdAt": "2025-06-10T10:00:00Z",
            "updatedAt": "2025-06-10T10:05:00Z",
            "shippingAddress": {
                "firstName": "Mar",
                "lastName": "Lin",
                "address1": "1 Harbor Way",
                "address2": null,
                "city": "Monterey",
                "province": "CA",
                "country": "United States",
                "zip": "93940",
                "phone": null
            },
            "billingAddress": null,
            "lineItems": {
                "edges": [
                    {"node": {
                        "id": "gid://shopify/LineItem/1",
                        "quantity": 3,
                        "variant": {"id": "gid://shopify/ProductVariant/111"},
                        "product": {"id": "gid://shopify/Product/987654321"},
                        "originalUnitPriceSet": {"shopMoney": {"amount": "19.99"}}
                    }},
                    {"node": {
                        "id": "gid://shopify/LineItem/2",
                        "quantity": 1,
                        "variant": null,
                        "product": null,
                        "originalUnitPriceSet": null
                    }}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_map_order() {
        let mapped = map_order(&fixture()).unwrap();
        assert_eq!(mapped.order.remote_id, RemoteId::new(7001));
        assert_eq!(mapped.order.order_number, 1042);
        assert_eq!(mapped.order.financial_status.as_deref(), Some("paid"));
        assert_eq!(mapped.order.total_price, Some(Decimal::new(5997, 2)));
        assert_eq!(
            mapped.order.customer_remote_id,
            Some(RemoteId::new(4411))
        );
        assert_eq!(mapped.items.len(), 2);
        assert!(mapped.shipping_address.is_some());
        assert!(mapped.billing_address.is_none());
    }

    #[test]
    fn test_line_item_without_refs_degrades_to_none() {
        let mapped = map_order(&fixture()).unwrap();
        let bare = &mapped.items[1];
        assert_eq!(bare.variant_remote_id, None);
        assert_eq!(bare.product_remote_id, None);
        assert_eq!(bare.unit_price, None);
        assert_eq!(bare.quantity, 1);
    }

    #[test]
    fn test_missing_order_number_is_malformed() {
        let raw: RemoteOrder = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Order/7002",
            "number": null
        }))
        .unwrap();
        assert!(matches!(
            map_order(&raw),
            Err(MapError::Malformed { entity: "order", .. })
        ));
    }
}
