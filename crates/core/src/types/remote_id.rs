//! Remote platform identifiers.
//!
//! The upstream platform addresses every entity with an opaque global id of
//! the form `gid://shopify/Product/987654321`. Only the trailing numeric
//! segment is stable and meaningful to us; it is stored locally as a
//! `BIGINT` and used as the idempotency key for every upsert.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when reducing a remote global id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoteIdError {
    /// The id string was empty or ended in a slash.
    #[error("empty remote id")]
    Empty,

    /// The trailing segment was not a base-10 integer.
    #[error("remote id has non-numeric trailing segment: {0:?}")]
    NotNumeric(String),
}

/// The immutable identifier assigned by the upstream platform to an entity.
///
/// Reduced from the platform's `gid://` form to its trailing numeric
/// segment. Two `RemoteId`s are equal exactly when they refer to the same
/// remote record, so this type is a direct equality key for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(i64);

impl RemoteId {
    /// Create a remote id from an already-reduced numeric value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Reduce a platform global id (`gid://shopify/Product/987654321`) to
    /// its trailing numeric segment.
    ///
    /// The conversion is exact: the trailing segment must consist solely of
    /// base-10 digits and fit in an `i64`. A bare numeric string (no
    /// slashes) is accepted as well.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteIdError::Empty`] if the trailing segment is empty and
    /// [`RemoteIdError::NotNumeric`] if it is not a valid integer.
    pub fn parse_gid(gid: &str) -> Result<Self, RemoteIdError> {
        let tail = gid.rsplit('/').next().unwrap_or_default();
        if tail.is_empty() {
            return Err(RemoteIdError::Empty);
        }
        tail.parse::<i64>()
            .map(Self)
            .map_err(|_| RemoteIdError::NotNumeric(tail.to_string()))
    }
}

impl std::fmt::Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RemoteId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<RemoteId> for i64 {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RemoteId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RemoteId {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(id))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RemoteId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gid_product() {
        let id = RemoteId::parse_gid("gid://shopify/Product/987654321");
        assert_eq!(id, Ok(RemoteId::new(987_654_321)));
    }

    #[test]
    fn test_parse_gid_bare_number() {
        assert_eq!(RemoteId::parse_gid("12345"), Ok(RemoteId::new(12345)));
    }

    #[test]
    fn test_parse_gid_non_numeric_suffix() {
        let err = RemoteId::parse_gid("gid://shopify/Product/abc123x");
        assert_eq!(err, Err(RemoteIdError::NotNumeric("abc123x".to_string())));
    }

    #[test]
    fn test_parse_gid_trailing_slash() {
        assert_eq!(RemoteId::parse_gid("gid://shopify/Product/"), Err(RemoteIdError::Empty));
    }

    #[test]
    fn test_parse_gid_empty() {
        assert_eq!(RemoteId::parse_gid(""), Err(RemoteIdError::Empty));
    }

    #[test]
    fn test_parse_gid_overflow() {
        // Larger than i64::MAX
        let err = RemoteId::parse_gid("gid://shopify/Product/99999999999999999999");
        assert!(matches!(err, Err(RemoteIdError::NotNumeric(_))));
    }

    #[test]
    fn test_display_and_conversions() {
        let id = RemoteId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i64::from(id), 42);
        assert_eq!(RemoteId::from(42i64), id);
    }
}
