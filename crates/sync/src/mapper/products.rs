//! Product mapping (parent plus variant and image children).

use chrono::{DateTime, Utc};
use coral_core::{RemoteId, parse_money};
use rust_decimal::Decimal;

use crate::shopify::types::{RemoteImage, RemoteProduct, RemoteVariant};

use super::MapError;

/// Field set for a product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub remote_id: RemoteId,
    pub title: String,
    pub handle: String,
    pub vendor: Option<String>,
    pub status: String,
    pub remote_created_at: Option<DateTime<Utc>>,
    pub remote_updated_at: Option<DateTime<Utc>>,
}

/// Field set for a product variant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub remote_id: RemoteId,
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub sku: Option<String>,
    pub inventory_quantity: Option<i64>,
    pub remote_created_at: Option<DateTime<Utc>>,
    pub remote_updated_at: Option<DateTime<Utc>>,
}

/// Field set for a product image row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub remote_id: RemoteId,
    pub alt_text: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub src: String,
}

/// A mapped product with its child field sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedProduct {
    pub product: NewProduct,
    pub variants: Vec<NewVariant>,
    pub images: Vec<NewImage>,
}

/// Map one raw product (and its nested variants and images) onto local
/// field sets.
///
/// # Errors
///
/// Returns [`MapError::RemoteId`] if the product's or any child's global
/// id is not numeric.
pub fn map_product(raw: &RemoteProduct) -> Result<MappedProduct, MapError> {
    let product = NewProduct {
        remote_id: RemoteId::parse_gid(&raw.id)?,
        title: raw.title.clone(),
        handle: raw.handle.clone(),
        vendor: raw.vendor.clone(),
        status: raw
            .status
            .as_deref()
            .unwrap_or("ACTIVE")
            .to_ascii_lowercase(),
        remote_created_at: raw.created_at,
        remote_updated_at: raw.updated_at,
    };

    let variants = match &raw.variants {
        Some(conn) => conn
            .edges
            .iter()
            .map(|e| map_variant(&e.node))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let images = match &raw.images {
        Some(conn) => conn
            .edges
            .iter()
            .map(|e| map_image(&e.node))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(MappedProduct {
        product,
        variants,
        images,
    })
}

fn map_variant(raw: &RemoteVariant) -> Result<NewVariant, MapError> {
    Ok(NewVariant {
        remote_id: RemoteId::parse_gid(&raw.id)?,
        title: raw.title.clone(),
        price: parse_money(raw.price.as_deref()),
        sku: raw.sku.clone(),
        inventory_quantity: raw.inventory_quantity,
        remote_created_at: raw.created_at,
        remote_updated_at: raw.updated_at,
    })
}

fn map_image(raw: &RemoteImage) -> Result<NewImage, MapError> {
    Ok(NewImage {
        remote_id: RemoteId::parse_gid(&raw.id)?,
        alt_text: raw.alt_text.clone(),
        width: raw.width,
        height: raw.height,
        src: raw.url.clone(),
    })
}
