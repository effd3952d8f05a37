//! Entity mappers: raw remote records to local field sets.
//!
//! Each mapper is a pure function from one deserialized remote record (and
//! its nested children) to the create/update field set for the parent row
//! plus one field set per child row. Mapping is deterministic: the same
//! raw record always produces the same field sets.
//!
//! Conventions shared by every mapper:
//! - `gid://` identifiers reduce exactly to their trailing numeric segment
//!   ([`coral_core::RemoteId::parse_gid`]); a non-numeric suffix fails the
//!   record
//! - numeric and monetary strings parse defensively: invalid or missing
//!   values map to `None`, never zero
//! - references to other remote entities (a line item's variant, an
//!   order's customer) stay remote ids here; the repository resolves them
//!   to local rows, degrading to `NULL` when the target is absent

pub mod collections;
pub mod customers;
pub mod orders;
pub mod products;
pub mod shop;

pub use collections::{MappedCollection, NewCollection, map_collection};
pub use customers::{MappedCustomer, NewAddress, NewCustomer, map_customer};
pub use orders::{
    AddressKind, MappedOrder, NewOrder, NewOrderAddress, NewOrderItem, map_order,
};
pub use products::{MappedProduct, NewImage, NewProduct, NewVariant, map_product};
pub use shop::{NewShop, map_shop};

use thiserror::Error;

/// A remote record that cannot be mapped onto the local schema.
#[derive(Debug, Error)]
pub enum MapError {
    /// A remote global id did not reduce to a numeric identifier.
    #[error("invalid remote id: {0}")]
    RemoteId(#[from] coral_core::RemoteIdError),

    /// The record is missing a field the local schema requires.
    #[error("malformed {entity} record: {reason}")]
    Malformed {
        entity: &'static str,
        reason: String,
    },
}
