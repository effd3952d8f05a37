//! Shop record mapping.

use coral_core::RemoteId;

use crate::shopify::types::RemoteShop;

use super::MapError;

/// Field set for the tenant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShop {
    pub remote_id: RemoteId,
    pub domain: String,
    pub name: String,
    pub email: Option<String>,
    pub currency_code: Option<String>,
}

/// Map the shop record onto the tenant field set.
///
/// # Errors
///
/// Returns [`MapError::RemoteId`] if the shop's global id is not numeric.
pub fn map_shop(raw: &RemoteShop) -> Result<NewShop, MapError> {
    Ok(NewShop {
        remote_id: RemoteId::parse_gid(&raw.id)?,
        domain: raw.myshopify_domain.clone(),
        name: raw.name.clone(),
        email: raw.email.clone(),
        currency_code: raw.currency_code.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_shop() {
        let raw: RemoteShop = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Shop/548380009",
            "name": "Coral Test Store",
            "email": "owner@example.com",
            "myshopifyDomain": "coral-test.myshopify.com",
            "currencyCode": "USD"
        }))
        .unwrap();

        let shop = map_shop(&raw).unwrap();
        assert_eq!(shop.remote_id, RemoteId::new(548_380_009));
        assert_eq!(shop.domain, "coral-test.myshopify.com");
        assert_eq!(shop.name, "Coral Test Store");
        assert_eq!(shop.email.as_deref(), Some("owner@example.com"));
        assert_eq!(shop.currency_code.as_deref(), Some("USD"));
    }

    #[test]
    fn test_map_shop_bad_gid() {
        let raw: RemoteShop = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Shop/not-a-number",
            "name": "Broken",
            "email": null,
            "myshopifyDomain": "broken.myshopify.com",
            "currencyCode": null
        }))
        .unwrap();

        assert!(matches!(map_shop(&raw), Err(MapError::RemoteId(_))));
    }
}
