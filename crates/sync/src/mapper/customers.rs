//! Customer mapping (parent plus address children).
//!
//! The spend/order aggregates are nullable end to end: stores whose API
//! scope omits them sync customers without aggregates rather than with
//! fabricated zeros.

use chrono::{DateTime, Utc};
use coral_core::{RemoteId, parse_count, parse_money};
use rust_decimal::Decimal;

use crate::shopify::types::{RemoteAddress, RemoteCustomer};

use super::MapError;

/// Field set for a customer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub remote_id: RemoteId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub total_spent: Option<Decimal>,
    pub orders_count: Option<i64>,
    pub remote_created_at: Option<DateTime<Utc>>,
    pub remote_updated_at: Option<DateTime<Utc>>,
}

/// Field set for a customer address row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub remote_id: RemoteId,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub is_default: bool,
}

/// A mapped customer with its address field sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedCustomer {
    pub customer: NewCustomer,
    pub addresses: Vec<NewAddress>,
}

/// Map one raw customer (and their addresses) onto local field sets.
///
/// Addresses without a remote id are skipped: they cannot be upserted
/// idempotently. The default flag is derived by comparing each address id
/// against the customer's `defaultAddress`.
///
/// # Errors
///
/// Returns [`MapError::RemoteId`] if the customer's global id is not
/// numeric.
pub fn map_customer(raw: &RemoteCustomer) -> Result<MappedCustomer, MapError> {
    let customer = NewCustomer {
        remote_id: RemoteId::parse_gid(&raw.id)?,
        first_name: raw.first_name.clone(),
        last_name: raw.last_name.clone(),
        email: raw.email.clone(),
        phone: raw.phone.clone(),
        total_spent: raw
            .amount_spent
            .as_ref()
            .and_then(|m| parse_money(m.amount.as_deref())),
        orders_count: parse_count(raw.number_of_orders.as_deref()),
        remote_created_at: raw.created_at,
        remote_updated_at: raw.updated_at,
    };

    let default_id = raw
        .default_address
        .as_ref()
        .and_then(|a| a.id.as_deref())
        .and_then(|id| RemoteId::parse_gid(id).ok());

    let addresses = raw
        .addresses
        .iter()
        .filter_map(|a| map_address(a, default_id))
        .collect();

    Ok(MappedCustomer {
        customer,
        addresses,
    })
}

fn map_address(raw: &RemoteAddress, default_id: Option<RemoteId>) -> Option<NewAddress> {
    let remote_id = RemoteId::parse_gid(raw.id.as_deref()?).ok()?;
    Some(NewAddress {
        remote_id,
        address1: raw.address1.clone(),
        address2: raw.address2.clone(),
        city: raw.city.clone(),
        province: raw.province.clone(),
        country: raw.country.clone(),
        zip: raw.zip.clone(),
        is_default: default_id == Some(remote_id),
    })
}
