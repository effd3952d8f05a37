//! Collection mapping (parent plus member product references).

use chrono::{DateTime, Utc};
use coral_core::RemoteId;

use crate::shopify::types::RemoteCollection;

use super::MapError;

/// Field set for a collection row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollection {
    pub remote_id: RemoteId,
    pub handle: String,
    pub title: String,
    pub remote_updated_at: Option<DateTime<Utc>>,
}

/// A mapped collection with the remote ids of its member products.
///
/// Membership is a join to products synced separately; the repository
/// resolves each remote id and skips members that have no local row yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedCollection {
    pub collection: NewCollection,
    pub product_remote_ids: Vec<RemoteId>,
}

/// Map one raw collection onto local field sets.
///
/// # Errors
///
/// Returns [`MapError::RemoteId`] if the collection's or any member's
/// global id is not numeric.
pub fn map_collection(raw: &RemoteCollection) -> Result<MappedCollection, MapError> {
    let collection = NewCollection {
        remote_id: RemoteId::parse_gid(&raw.id)?,
        handle: raw.handle.clone(),
        title: raw.title.clone(),
        remote_updated_at: raw.updated_at,
    };

    let product_remote_ids = match &raw.products {
        Some(conn) => conn
            .edges
            .iter()
            .map(|e| RemoteId::parse_gid(&e.node.id))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(MappedCollection {
        collection,
        product_remote_ids,
    })
}
